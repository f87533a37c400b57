use std::fmt::{self, Display};

use thiserror::Error;
use todolist_core::{FilterValue, Priority, SortKey, Status, TaskFilter, TextMatcher, ViewQuery};

/// Error type returned while constructing view queries from user-facing inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterBuildError {
    /// A filter token named neither a status nor a priority.
    #[error("invalid filter: {token}")]
    InvalidFilter {
        /// Offending token.
        token: String,
    },
    /// A sort token named no known key.
    #[error("invalid sort key: {token}")]
    InvalidSortKey {
        /// Offending token.
        token: String,
    },
}

/// Result alias for filter construction helpers.
pub type FilterBuildResult<T> = Result<T, FilterBuildError>;

/// Builder that accepts user-facing strings and normalizes them into a [`ViewQuery`].
#[derive(Debug, Clone, Default)]
pub struct ViewQueryBuilder {
    filters: Vec<FilterValue>,
    sort: Option<SortKey>,
    text: Option<String>,
}

impl ViewQueryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the category filters (logical OR).
    ///
    /// # Errors
    /// Returns an error if any token names neither a status nor a priority.
    pub fn with_filters(mut self, tokens: &[String]) -> FilterBuildResult<Self> {
        self.filters.extend(parse_filter_tokens(tokens)?);
        Ok(self)
    }

    /// Set the sort key. Blank tokens and `None` leave the default ordering.
    ///
    /// # Errors
    /// Returns an error if the token does not name a sort key.
    pub fn with_sort(mut self, sort: Option<&str>) -> FilterBuildResult<Self> {
        let Some(token) = sort.map(str::trim).filter(|token| !token.is_empty()) else {
            return Ok(self);
        };
        let key = token
            .parse::<SortKey>()
            .map_err(|_| FilterBuildError::InvalidSortKey {
                token: token.to_owned(),
            })?;
        self.sort = Some(key);
        Ok(self)
    }

    /// Configure the optional search text, taken as typed. Empty input becomes `None`.
    #[must_use]
    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.text = text.filter(|raw| !raw.is_empty());
        self
    }

    /// Build the final [`ViewQuery`].
    #[must_use]
    pub fn build(self) -> ViewQuery {
        ViewQuery {
            filter: self.filters.into_iter().collect::<TaskFilter>(),
            search: self.text.as_deref().and_then(TextMatcher::new),
            sort: self.sort,
        }
    }
}

/// Convert arbitrary tokens into [`FilterValue`]s.
///
/// # Errors
/// Returns an error if any token names neither a status nor a priority.
pub fn parse_filter_tokens(tokens: &[String]) -> FilterBuildResult<Vec<FilterValue>> {
    tokens
        .iter()
        .map(|token| {
            token
                .parse::<FilterValue>()
                .map_err(|_| FilterBuildError::InvalidFilter {
                    token: token.to_string(),
                })
        })
        .collect()
}

impl FilterBuildError {
    /// Convert the error into a message that is friendly for end-users.
    #[must_use]
    pub fn describe_user_facing(&self) -> String {
        match self {
            Self::InvalidFilter { token } => {
                let allowed: Vec<&str> = Status::ALL
                    .iter()
                    .map(|status| status.as_str())
                    .chain(Priority::ALL.iter().map(|priority| priority.as_str()))
                    .collect();
                format!("unknown filter '{token}' (expected one of: {})", allowed.join(", "))
            }
            Self::InvalidSortKey { token } => {
                format!("unknown sort key '{token}' (expected one of: time, priority, status)")
            }
        }
    }
}

impl Display for ViewQueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewQueryBuilder")
            .field("filters", &self.filters)
            .field("sort", &self.sort)
            .field("text", &self.text)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> T {
        result.unwrap_or_else(|err| panic!("{context}: {err}"))
    }

    #[test]
    fn test_parse_filter_tokens() {
        let tokens = vec!["urgent".into(), "Not-Urgent ".into(), "OVERDUE".into()];
        let parsed = ok(parse_filter_tokens(&tokens), "parse filters");
        assert_eq!(
            parsed,
            vec![
                FilterValue::Priority(Priority::Urgent),
                FilterValue::Priority(Priority::NotUrgent),
                FilterValue::Status(Status::Overdue),
            ]
        );
    }

    #[test]
    fn test_invalid_tokens_are_reported() {
        let err = ViewQueryBuilder::new()
            .with_filters(&["someday".into()])
            .err()
            .unwrap_or_else(|| panic!("unknown filter must fail"));
        assert_eq!(
            err,
            FilterBuildError::InvalidFilter {
                token: "someday".into()
            }
        );
        assert!(err.describe_user_facing().contains("not urgent"));

        let err = ViewQueryBuilder::new()
            .with_sort(Some("alphabet"))
            .err()
            .unwrap_or_else(|| panic!("unknown sort must fail"));
        assert!(matches!(err, FilterBuildError::InvalidSortKey { .. }));
    }

    #[test]
    fn test_blank_inputs_leave_defaults() {
        let query = ok(
            ViewQueryBuilder::new().with_sort(Some("  ")),
            "blank sort",
        )
        .with_text(Some(String::new()))
        .build();
        assert_eq!(query, ViewQuery::default());

        let query = ViewQueryBuilder::new().with_text(Some("  ".into())).build();
        assert_eq!(query.search.as_ref().map(TextMatcher::needle), Some("  "));
    }

    #[test]
    fn test_builder_full_workflow() {
        let query = ok(
            ok(
                ViewQueryBuilder::new().with_filters(&["urgent".into(), "Completed".into()]),
                "filters",
            )
            .with_sort(Some("Priority")),
            "sort",
        )
        .with_text(Some("Rent ".into()))
        .build();

        assert!(query.filter.contains(FilterValue::Priority(Priority::Urgent)));
        assert!(query.filter.contains(FilterValue::Status(Status::Completed)));
        assert_eq!(query.sort, Some(SortKey::Priority));
        assert_eq!(
            query.search.as_ref().map(TextMatcher::needle),
            Some("rent ")
        );
    }
}
