use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};

use taskdeck_lib::editor::RowEditor;
use taskdeck_lib::models::{Priority, Task, TaskPatch};
use taskdeck_lib::query::{self, StatusFilter};
use taskdeck_lib::store::TaskStore;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Receiving-desk task list with daily seeded routines")]
struct Cli {
    /// Data directory; defaults to $TASKDECK_DATA_DIR, then the platform data dir.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the grouped task list
    List {
        /// Substring match against title or description
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = StatusCli::Open)]
        status: StatusCli,
    },
    /// Add a task
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_enum, default_value_t = PriorityCli::Med)]
        priority: PriorityCli,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Edit a task's fields (id may be a unique prefix)
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<PriorityCli>,
        #[arg(long, conflicts_with = "no_due")]
        due: Option<NaiveDate>,
        /// Clear the due date
        #[arg(long)]
        no_due: bool,
    },
    /// Toggle a task done/open
    Done { id: String },
    /// Delete a task
    Rm { id: String },
    /// Remove every completed task
    ClearDone,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusCli {
    Open,
    All,
    Done,
}

impl From<StatusCli> for StatusFilter {
    fn from(value: StatusCli) -> Self {
        match value {
            StatusCli::Open => StatusFilter::Open,
            StatusCli::All => StatusFilter::All,
            StatusCli::Done => StatusFilter::Done,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PriorityCli {
    Low,
    Med,
    High,
}

impl From<PriorityCli> for Priority {
    fn from(value: PriorityCli) -> Self {
        match value {
            PriorityCli::Low => Priority::Low,
            PriorityCli::Med => Priority::Med,
            PriorityCli::High => Priority::High,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir);

    if let Err(error) = taskdeck_lib::logging::init_logging(&data_dir) {
        eprintln!("warning: file logging unavailable: {error}");
    }

    let store = match taskdeck_lib::initialize(data_dir) {
        Ok(store) => store,
        Err(error) => {
            eprintln!("error: could not open data directory: {error}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::List { search, status } => {
            print_list(&store, &search, status.into());
            ExitCode::SUCCESS
        }
        Commands::Add {
            title,
            description,
            priority,
            due,
        } => match store.create(&title, &description, priority.into(), due) {
            Some(task) => {
                println!("added {}", short_id(&task));
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("error: title must not be empty");
                ExitCode::FAILURE
            }
        },
        Commands::Edit {
            id,
            title,
            description,
            priority,
            due,
            no_due,
        } => {
            let Some(id) = resolve_id(&store, &id) else {
                return ExitCode::FAILURE;
            };
            // Bounded-choice fields commit immediately.
            let mut immediate = TaskPatch::default();
            if let Some(priority) = priority {
                immediate.priority = Some(priority.into());
            }
            if no_due {
                immediate.due = Some(None);
            } else if let Some(due) = due {
                immediate.due = Some(Some(due));
            }
            let had_immediate = !immediate.is_empty();
            if had_immediate {
                store.update(&id, immediate);
            }
            // Free text goes through the staged row editor.
            let mut staged = false;
            if title.is_some() || description.is_some() {
                let Some(task) = store.get(&id) else {
                    return ExitCode::FAILURE;
                };
                let mut editor = RowEditor::new(&task);
                if let Some(title) = title {
                    editor.title = title;
                }
                if let Some(description) = description {
                    editor.description = description;
                }
                staged = editor.save(&store);
            }
            if !had_immediate && !staged {
                println!("nothing changed");
            }
            ExitCode::SUCCESS
        }
        Commands::Done { id } => {
            let Some(id) = resolve_id(&store, &id) else {
                return ExitCode::FAILURE;
            };
            store.toggle_done(&id);
            if let Some(task) = store.get(&id) {
                println!(
                    "{} {}",
                    if task.done { "done" } else { "reopened" },
                    task.title
                );
            }
            ExitCode::SUCCESS
        }
        Commands::Rm { id } => {
            let Some(id) = resolve_id(&store, &id) else {
                return ExitCode::FAILURE;
            };
            store.remove(&id);
            println!("removed {id}");
            ExitCode::SUCCESS
        }
        Commands::ClearDone => {
            let before = store.tasks().len();
            store.clear_completed();
            println!("cleared {} task(s)", before - store.tasks().len());
            ExitCode::SUCCESS
        }
    }
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Some(dir) = std::env::var_os("TASKDECK_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|dir| dir.join("taskdeck"))
        .unwrap_or_else(|| PathBuf::from(".taskdeck"))
}

/// Accepts a full id or a unique prefix, since uuids are unpleasant to type.
fn resolve_id(store: &TaskStore, needle: &str) -> Option<String> {
    let tasks = store.tasks();
    let mut matches = tasks.iter().filter(|task| task.id.starts_with(needle));
    let Some(first) = matches.next() else {
        eprintln!("error: no task matches id '{needle}'");
        return None;
    };
    if matches.next().is_some() {
        eprintln!("error: id prefix '{needle}' is ambiguous");
        return None;
    }
    Some(first.id.clone())
}

fn print_list(store: &TaskStore, search: &str, status: StatusFilter) {
    let tasks = store.tasks();
    let progress = query::progress(&tasks);
    println!(
        "{}/{} done ({}%)",
        progress.done,
        progress.total,
        progress.percent()
    );

    let list = query::search(&tasks, search, status);
    if list.is_empty() {
        println!("No tasks match your filters.");
        return;
    }

    let today = Local::now().date_naive();
    let grouped = query::group(&list, today);
    for (section, tasks) in grouped.sections() {
        if tasks.is_empty() {
            continue;
        }
        println!("\n{}", section.label().to_uppercase());
        for task in tasks {
            println!("{}", format_row(task));
        }
    }
}

fn format_row(task: &Task) -> String {
    let mark = if task.done { "x" } else { " " };
    let mut line = format!("  [{mark}] {}  {}  ({})", short_id(task), task.title, task.priority);
    if let Some(due) = task.due {
        line.push_str(&format!("  due {due}"));
    }
    if !task.description.is_empty() {
        line.push_str(&format!("\n          {}", task.description));
    }
    line
}

fn short_id(task: &Task) -> &str {
    &task.id[..task.id.len().min(8)]
}
