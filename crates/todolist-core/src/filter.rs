//! Category filters over status and priority.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::task::{Priority, Status, Task};

/// A single category a task can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterValue {
    /// Matches tasks in this status.
    Status(Status),
    /// Matches tasks with this priority.
    Priority(Priority),
}

impl FilterValue {
    /// Whether the task's status or priority equals this value.
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::Status(status) => task.status == status,
            Self::Priority(priority) => task.priority == priority,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => status.fmt(f),
            Self::Priority(priority) => priority.fmt(f),
        }
    }
}

impl FromStr for FilterValue {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Status>()
            .map(Self::Status)
            .or_else(|_| s.parse::<Priority>().map(Self::Priority))
            .map_err(|_| ParseError::Filter(s.to_owned()))
    }
}

/// Set of active category filters combined with logical OR.
///
/// An empty filter lets every task through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    values: HashSet<FilterValue>,
}

impl TaskFilter {
    /// Filter that keeps every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse each token as a status or priority.
    ///
    /// # Errors
    /// Returns the first token that names neither.
    pub fn from_tokens<I, T>(tokens: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        tokens
            .into_iter()
            .map(|token| token.as_ref().parse::<FilterValue>())
            .collect::<Result<HashSet<_>, _>>()
            .map(|values| Self { values })
    }

    /// Add a value to the active set.
    #[must_use]
    pub fn with(mut self, value: FilterValue) -> Self {
        self.values.insert(value);
        self
    }

    /// Whether no filter is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `value` is active.
    #[must_use]
    pub fn contains(&self, value: FilterValue) -> bool {
        self.values.contains(&value)
    }

    /// Keep the task when any active value matches it.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.is_empty() || self.values.iter().any(|value| value.matches(task))
    }
}

impl FromIterator<FilterValue> for TaskFilter {
    fn from_iter<I: IntoIterator<Item = FilterValue>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
