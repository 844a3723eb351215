use std::cmp::Ordering;

use chrono::{Duration, NaiveDate};

use crate::models::Task;

/// How many days past today still count as "Upcoming".
const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    Open,
    All,
    Done,
}

impl StatusFilter {
    fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::Open => !task.done,
            StatusFilter::All => true,
            StatusFilter::Done => task.done,
        }
    }
}

/// Filters by substring + status, then applies the four-key sort. Pure; the
/// caller's collection is untouched.
pub fn search(tasks: &[Task], term: &str, status: StatusFilter) -> Vec<Task> {
    let term = term.trim().to_lowercase();
    let mut result: Vec<Task> = tasks
        .iter()
        .filter(|task| matches_term(task, &term) && status.matches(task))
        .cloned()
        .collect();
    result.sort_by(compare);
    result
}

fn matches_term(task: &Task, term: &str) -> bool {
    term.is_empty()
        || task.title.to_lowercase().contains(term)
        || task.description.to_lowercase().contains(term)
}

/// Stable total order: open before done, earlier due first with dated tasks
/// before undated, then priority rank descending, then created_at ascending.
fn compare(a: &Task, b: &Task) -> Ordering {
    a.done
        .cmp(&b.done)
        .then_with(|| match (a.due, b.due) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
        .then_with(|| a.created_at.cmp(&b.created_at))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueGroup {
    Overdue,
    Today,
    Upcoming,
    NoDate,
}

impl DueGroup {
    pub fn label(self) -> &'static str {
        match self {
            DueGroup::Overdue => "Overdue",
            DueGroup::Today => "Today",
            DueGroup::Upcoming => "Upcoming",
            DueGroup::NoDate => "No date",
        }
    }
}

pub fn classify(due: Option<NaiveDate>, today: NaiveDate) -> DueGroup {
    match due {
        None => DueGroup::NoDate,
        Some(day) if day < today => DueGroup::Overdue,
        Some(day) if day == today => DueGroup::Today,
        Some(day) if day <= today + Duration::days(UPCOMING_WINDOW_DAYS) => DueGroup::Upcoming,
        // Past the upcoming window the date stops driving placement.
        Some(_) => DueGroup::NoDate,
    }
}

/// The four due-date buckets, always all computed; rendering skips the empty
/// ones. Input order is preserved within each bucket.
#[derive(Debug, Clone, Default)]
pub struct Grouped {
    pub overdue: Vec<Task>,
    pub today: Vec<Task>,
    pub upcoming: Vec<Task>,
    pub no_date: Vec<Task>,
}

impl Grouped {
    pub fn sections(&self) -> [(DueGroup, &[Task]); 4] {
        [
            (DueGroup::Overdue, self.overdue.as_slice()),
            (DueGroup::Today, self.today.as_slice()),
            (DueGroup::Upcoming, self.upcoming.as_slice()),
            (DueGroup::NoDate, self.no_date.as_slice()),
        ]
    }

    pub fn len(&self) -> usize {
        self.overdue.len() + self.today.len() + self.upcoming.len() + self.no_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn group(tasks: &[Task], today: NaiveDate) -> Grouped {
    let mut grouped = Grouped::default();
    for task in tasks {
        let bucket = match classify(task.due, today) {
            DueGroup::Overdue => &mut grouped.overdue,
            DueGroup::Today => &mut grouped.today,
            DueGroup::Upcoming => &mut grouped.upcoming,
            DueGroup::NoDate => &mut grouped.no_date,
        };
        bucket.push(task.clone());
    }
    grouped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.done * 100) as f64 / self.total as f64).round() as u32
    }
}

pub fn progress(tasks: &[Task]) -> Progress {
    Progress {
        done: tasks.iter().filter(|task| task.done).count(),
        total: tasks.len(),
    }
}
