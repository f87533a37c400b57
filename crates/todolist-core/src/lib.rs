//! Domain types & projection logic for todolist.

/// Source of the current instant.
pub mod clock;
/// Parse errors for user-facing tokens.
pub mod error;
/// Category filters.
pub mod filter;
/// Identifier types.
pub mod id;
/// Overdue sweep, filtering and sorting.
pub mod projector;
/// The task entity.
pub mod task;
/// Description search.
pub mod text_matcher;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ParseError;
pub use filter::{FilterValue, TaskFilter};
pub use id::TaskId;
pub use projector::{SortKey, ViewQuery, project, sweep_overdue};
pub use task::{Priority, Status, Task};
pub use text_matcher::TextMatcher;
