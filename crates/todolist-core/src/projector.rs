//! Status sweep, filtering and ordering of the task list.
//!
//! Projection always runs in the same order: the overdue sweep over the whole
//! persisted collection, then the category filter, then the search predicate,
//! and finally a stable sort.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use time::PrimitiveDateTime;
use tracing::debug;

use crate::error::ParseError;
use crate::filter::TaskFilter;
use crate::task::{Task, normalize_token};
use crate::text_matcher::TextMatcher;

/// Explicit ordering selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Earliest due instant first; malformed instants last.
    Time,
    /// `urgent`, then `normal`, then `not urgent`.
    Priority,
    /// `Overdue`, then `Pending`, then `Completed`.
    Status,
}

impl SortKey {
    /// Token accepted on the command line and in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Priority => "priority",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "time" | "due" => Ok(Self::Time),
            "priority" => Ok(Self::Priority),
            "status" => Ok(Self::Status),
            _ => Err(ParseError::SortKey(s.to_owned())),
        }
    }
}

/// Mark every past-due pending task as overdue. Returns how many changed.
pub fn sweep_overdue(tasks: &mut [Task], now: PrimitiveDateTime) -> usize {
    let changed = tasks
        .iter_mut()
        .map(|task| task.refresh_overdue(now))
        .filter(|changed| *changed)
        .count();
    debug!(changed, total = tasks.len(), "overdue sweep");
    changed
}

/// Run the full pipeline with an arbitrary search predicate.
///
/// `tasks` is the persisted collection; the sweep mutates it in place so the
/// caller can write the derived statuses back. The returned list is a view and
/// its positions carry no meaning for later mutations.
pub fn project<F>(
    tasks: &mut [Task],
    filter: &TaskFilter,
    search: F,
    sort: Option<SortKey>,
    now: PrimitiveDateTime,
) -> Vec<Task>
where
    F: Fn(&Task) -> bool,
{
    sweep_overdue(tasks, now);

    let mut visible: Vec<Task> = tasks
        .iter()
        .filter(|task| filter.matches(task))
        .filter(|task| search(task))
        .cloned()
        .collect();

    // `sort_by` is stable, so ties keep persisted order.
    visible.sort_by(|a, b| compare(sort, a, b));
    visible
}

/// Ordering used by [`project`] for the given key.
#[must_use]
pub fn compare(sort: Option<SortKey>, a: &Task, b: &Task) -> Ordering {
    match sort {
        Some(SortKey::Time) => compare_due(a, b),
        Some(SortKey::Priority) => a.priority.rank().cmp(&b.priority.rank()),
        Some(SortKey::Status) => a.status.rank().cmp(&b.status.rank()),
        None => collate(&a.description, &b.description),
    }
}

fn compare_due(a: &Task, b: &Task) -> Ordering {
    match (a.due(), b.due()) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-folded comparison with a case-sensitive tiebreak, so `apple < banana < Banana`.
///
/// Folded strings compare by code point: `éclair` sorts after `zebra`.
#[must_use]
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Everything a view needs besides the tasks themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// Active category filters.
    pub filter: TaskFilter,
    /// Optional description search.
    pub search: Option<TextMatcher>,
    /// Optional explicit ordering.
    pub sort: Option<SortKey>,
}

impl ViewQuery {
    /// Project `tasks` through this query.
    pub fn project(&self, tasks: &mut [Task], now: PrimitiveDateTime) -> Vec<Task> {
        project(
            tasks,
            &self.filter,
            |task| self.search.as_ref().is_none_or(|matcher| matcher.matches(task)),
            self.sort,
            now,
        )
    }
}
