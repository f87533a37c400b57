use crate::task::Task;

/// Case-insensitive substring matcher over task descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Lowercase a query string into a matcher. Returns `None` for an empty query.
    ///
    /// Whitespace is part of the needle: `"pay "` does not match `"Payment"`.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        Some(Self {
            needle: query.to_lowercase(),
        })
    }

    /// The normalized query.
    #[must_use]
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Determine whether the task description contains the query.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        task.description.to_lowercase().contains(&self.needle)
    }
}
