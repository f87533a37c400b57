use anyhow::Result;
use thiserror::Error;
use todolist_core::{Clock, Priority, SystemClock, Task, TaskId, ViewQuery, sweep_overdue};
use todolist_store::{KeyValueStore, TaskCollection};
use tracing::{debug, info};

/// Failures specific to task lookups and creation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// No persisted task has this identifier or abbreviation.
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    /// The abbreviation matches more than one persisted task.
    #[error("Task id '{token}' is ambiguous ({candidates} matches)")]
    AmbiguousId {
        /// Abbreviation as given.
        token: String,
        /// Number of matching tasks.
        candidates: usize,
    },
    /// The date/time pair does not form a valid instant.
    #[error("invalid due date/time: '{date} {time}' (expected YYYY-MM-DD HH:MM)")]
    InvalidDue {
        /// Date as given.
        date: String,
        /// Time as given.
        time: String,
    },
}

/// Service façade that owns the store and performs every task mutation.
///
/// Each operation reads the whole collection, changes it in memory and writes
/// the whole collection back.
pub struct TaskService<S, C = SystemClock> {
    collection: TaskCollection<S>,
    clock: C,
}

impl<S> TaskService<S, SystemClock> {
    /// Service using the system clock.
    #[must_use]
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self::with_clock(store, key, SystemClock)
    }
}

impl<S, C> TaskService<S, C> {
    /// Service using an explicit clock.
    #[must_use]
    pub fn with_clock(store: S, key: impl Into<String>, clock: C) -> Self {
        Self {
            collection: TaskCollection::new(store, key),
            clock,
        }
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        self.collection.store()
    }
}

impl<S: KeyValueStore, C: Clock> TaskService<S, C> {
    /// Read the persisted collection.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn load(&self) -> Result<Vec<Task>> {
        self.collection.load()
    }

    /// Replace the persisted collection.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn save(&mut self, tasks: &[Task]) -> Result<()> {
        self.collection.save(tasks)
    }

    /// Sweep, persist, then filter and sort for display.
    ///
    /// The collection is written back only when the sweep changed a status or
    /// id-less records were given identifiers, even when the view is empty.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn project(&mut self, query: &ViewQuery) -> Result<Vec<Task>> {
        let loaded = self.collection.load_detailed()?;
        let mut tasks = loaded.tasks;
        let now = self.clock.now();
        let swept = sweep_overdue(&mut tasks, now);
        let visible = query.project(&mut tasks, now);

        if swept > 0 || loaded.assigned_ids > 0 {
            self.save(&tasks)?;
        } else {
            debug!(unreadable = loaded.unreadable, "view left the collection unchanged");
        }
        Ok(visible)
    }

    /// Append a new pending task.
    ///
    /// # Errors
    /// Returns [`ServiceError::InvalidDue`] for malformed date/time input, or a
    /// store error.
    pub fn add(&mut self, input: CreateTaskInput) -> Result<Task> {
        let CreateTaskInput {
            description,
            date,
            time,
            priority,
        } = input;
        let task = Task::new(description, date, time, priority);
        if task.due().is_none() {
            return Err(ServiceError::InvalidDue {
                date: task.date,
                time: task.time,
            }
            .into());
        }

        let mut tasks = self.load()?;
        tasks.push(task.clone());
        self.save(&tasks)?;
        info!(task = %task.id, priority = %task.priority, "created task");
        Ok(task)
    }

    /// Flip a task between `Completed` and `Pending`.
    ///
    /// # Errors
    /// Returns [`ServiceError::TaskNotFound`] or a store error.
    pub fn toggle(&mut self, id: TaskId) -> Result<Task> {
        let mut tasks = self.load()?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| ServiceError::TaskNotFound(id.to_string()))?;
        task.toggle();
        let toggled = task.clone();
        self.save(&tasks)?;
        info!(task = %id, status = %toggled.status, "toggled task");
        Ok(toggled)
    }

    /// Remove a task.
    ///
    /// # Errors
    /// Returns [`ServiceError::TaskNotFound`] or a store error.
    pub fn delete(&mut self, id: TaskId) -> Result<Task> {
        let mut tasks = self.load()?;
        let position = tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| ServiceError::TaskNotFound(id.to_string()))?;
        let removed = tasks.remove(position);
        self.save(&tasks)?;
        info!(task = %id, "deleted task");
        Ok(removed)
    }

    /// Fetch one task.
    ///
    /// # Errors
    /// Returns [`ServiceError::TaskNotFound`] or a store error.
    pub fn get(&self, id: TaskId) -> Result<Task> {
        self.load()?
            .into_iter()
            .find(|task| task.id == id)
            .ok_or_else(|| ServiceError::TaskNotFound(id.to_string()).into())
    }

    /// Resolve a full identifier or a unique abbreviation against the persisted collection.
    ///
    /// # Errors
    /// Returns [`ServiceError::TaskNotFound`] when nothing matches and
    /// [`ServiceError::AmbiguousId`] when several tasks match.
    pub fn resolve(&self, token: &str) -> Result<TaskId> {
        let token = token.trim();
        let tasks = self.load()?;
        if let Ok(id) = token.parse::<TaskId>() {
            if tasks.iter().any(|task| task.id == id) {
                return Ok(id);
            }
            return Err(ServiceError::TaskNotFound(token.to_owned()).into());
        }

        let mut matches = tasks.iter().filter(|task| task.id.matches_abbreviation(token));
        match (matches.next(), matches.count()) {
            (Some(task), 0) => Ok(task.id),
            (Some(_), rest) => Err(ServiceError::AmbiguousId {
                token: token.to_owned(),
                candidates: rest + 1,
            }
            .into()),
            (None, _) => Err(ServiceError::TaskNotFound(token.to_owned()).into()),
        }
    }
}

/// Fields collected when creating a task.
pub struct CreateTaskInput {
    /// Free-text label.
    pub description: String,
    /// Due date, `YYYY-MM-DD`.
    pub date: String,
    /// Due time, `HH:MM`.
    pub time: String,
    /// Priority, `normal` unless chosen otherwise.
    pub priority: Priority,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::PrimitiveDateTime;
    use time::macros::datetime;
    use todolist_core::{FixedClock, Status, TaskFilter, TextMatcher};
    use todolist_store::{DEFAULT_KEY, MemoryStore};

    const NOW: PrimitiveDateTime = datetime!(2025-06-15 12:00);

    fn ok<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> T {
        result.unwrap_or_else(|err| panic!("{context}: {err}"))
    }

    fn service() -> TaskService<MemoryStore, FixedClock> {
        TaskService::with_clock(MemoryStore::new(), DEFAULT_KEY, FixedClock(NOW))
    }

    fn input(description: &str, date: &str, priority: Priority) -> CreateTaskInput {
        CreateTaskInput {
            description: description.into(),
            date: date.into(),
            time: "09:00".into(),
            priority,
        }
    }

    fn service_error(err: &anyhow::Error) -> &ServiceError {
        err.downcast_ref::<ServiceError>()
            .unwrap_or_else(|| panic!("expected ServiceError, got {err}"))
    }

    #[test]
    fn add_appends_pending_task() {
        let mut service = service();
        let created = ok(service.add(input("file taxes", "2025-07-01", Priority::Urgent)), "add");

        assert_eq!(created.status, Status::Pending);
        let stored = ok(service.load(), "load");
        assert_eq!(stored, vec![created]);
    }

    #[test]
    fn add_rejects_malformed_due() {
        let mut service = service();
        let Err(err) = service.add(input("broken", "07/01/2025", Priority::Normal)) else {
            panic!("malformed date must be rejected");
        };
        assert!(matches!(service_error(&err), ServiceError::InvalidDue { .. }));
        assert!(ok(service.load(), "load").is_empty());
    }

    #[test]
    fn project_persists_overdue_sweep() {
        let mut service = service();
        let past = ok(service.add(input("past", "2025-06-01", Priority::Normal)), "add past");
        ok(service.add(input("future", "2025-07-01", Priority::Normal)), "add future");

        let query = ViewQuery {
            filter: TaskFilter::from_tokens(["not urgent"]).unwrap_or_else(|err| panic!("{err}")),
            ..ViewQuery::default()
        };
        let visible = ok(service.project(&query), "project");
        assert!(visible.is_empty());

        let stored = ok(service.get(past.id), "get");
        assert_eq!(stored.status, Status::Overdue);
    }

    #[test]
    fn toggle_completes_overdue_and_reopens_completed() {
        let mut service = service();
        let past = ok(service.add(input("past", "2025-06-01", Priority::Normal)), "add");
        ok(service.project(&ViewQuery::default()), "project");

        assert_eq!(ok(service.toggle(past.id), "toggle").status, Status::Completed);
        assert_eq!(ok(service.toggle(past.id), "toggle").status, Status::Pending);

        // The next view re-derives the overdue status.
        let visible = ok(service.project(&ViewQuery::default()), "project");
        assert_eq!(visible[0].status, Status::Overdue);
    }

    #[test]
    fn delete_from_filtered_view_removes_the_selected_task() {
        let mut service = service();
        ok(service.add(input("alpha chores", "2025-07-01", Priority::NotUrgent)), "add");
        ok(service.add(input("bravo report", "2025-07-02", Priority::Urgent)), "add");
        ok(service.add(input("charlie report", "2025-07-03", Priority::Urgent)), "add");

        let query = ViewQuery {
            search: TextMatcher::new("report"),
            sort: Some(todolist_core::SortKey::Time),
            ..ViewQuery::default()
        };
        let visible = ok(service.project(&query), "project");
        // First rendered card is persisted index 1, not index 0.
        let selected = visible[0].clone();
        assert_eq!(selected.description, "bravo report");

        let removed = ok(service.delete(selected.id), "delete");
        assert_eq!(removed.id, selected.id);

        let remaining: Vec<_> = ok(service.load(), "load")
            .into_iter()
            .map(|task| task.description)
            .collect();
        assert_eq!(remaining, vec!["alpha chores", "charlie report"]);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut service = service();
        let missing = TaskId::new();
        let Err(err) = service.toggle(missing) else {
            panic!("unknown id must fail");
        };
        assert_eq!(service_error(&err), &ServiceError::TaskNotFound(missing.to_string()));
        assert!(service.delete(missing).is_err());
    }

    #[test]
    fn resolve_accepts_full_ids_and_unique_abbreviations() {
        let mut service = service();
        let created = ok(service.add(input("one", "2025-07-01", Priority::Normal)), "add");

        assert_eq!(ok(service.resolve(&created.id.to_string()), "full id"), created.id);
        assert_eq!(ok(service.resolve(&created.id.short()), "short id"), created.id);

        let Err(err) = service.resolve("zzzz") else {
            panic!("unknown abbreviation must fail");
        };
        assert!(matches!(service_error(&err), ServiceError::TaskNotFound(_)));
    }

    #[test]
    fn resolve_rejects_ambiguous_prefixes() {
        let mut service = service();
        let mut tasks = Vec::new();
        for description in ["a", "b"] {
            let mut task = Task::new(description, "2025-07-01", "09:00", Priority::Normal);
            task.id = ok(
                format!("0190a000-0000-7000-8000-00000000000{}", tasks.len()).parse::<TaskId>(),
                "fixed id",
            );
            tasks.push(task);
        }
        ok(service.save(&tasks), "save");

        let Err(err) = service.resolve("0190a000") else {
            panic!("shared prefix must be ambiguous");
        };
        assert_eq!(
            service_error(&err),
            &ServiceError::AmbiguousId {
                token: "0190a000".into(),
                candidates: 2,
            }
        );
    }

    #[test]
    fn legacy_records_get_durable_ids_after_projection() {
        let mut store = MemoryStore::new();
        ok(
            store.set(
                DEFAULT_KEY,
                r#"[{"description":"legacy","date":"2025-07-01","time":"10:00","priority":"normal","status":"Pending"}]"#.into(),
            ),
            "seed",
        );
        let mut service = TaskService::with_clock(store, DEFAULT_KEY, FixedClock(NOW));

        let visible = ok(service.project(&ViewQuery::default()), "project");
        let id = visible[0].id;
        assert_eq!(ok(service.get(id), "get").description, "legacy");
    }

    #[test]
    fn listing_keeps_records_it_cannot_read() {
        let mut store = MemoryStore::new();
        ok(
            store.set(
                DEFAULT_KEY,
                r#"[{"id":"0190a000-0000-7000-8000-000000000001","description":"keep","date":"2025-07-01","time":"10:00","priority":"normal","status":"Pending"},{"description":"rent","date":"2025-07-01","time":"10:00","priority":"Normal","status":"Pending"},{"description":"odd","date":"2025-07-01","time":"10:00","priority":"someday"}]"#.into(),
            ),
            "seed",
        );
        let mut service = TaskService::with_clock(store, DEFAULT_KEY, FixedClock(NOW));

        let visible = ok(service.project(&ViewQuery::default()), "project");
        let descriptions: Vec<_> = visible.iter().map(|task| task.description.as_str()).collect();
        assert_eq!(descriptions, vec!["keep", "rent"]);

        let raw = ok(service.store().get(DEFAULT_KEY), "raw")
            .unwrap_or_else(|| panic!("collection must still be stored"));
        assert!(raw.contains("\"rent\""));
        assert!(raw.contains("\"someday\""));

        // A later mutation still writes the unreadable record back.
        ok(service.delete(visible[0].id), "delete");
        let raw = ok(service.store().get(DEFAULT_KEY), "raw")
            .unwrap_or_else(|| panic!("collection must still be stored"));
        assert!(!raw.contains("\"keep\""));
        assert!(raw.contains("\"someday\""));
    }

    #[test]
    fn listing_without_changes_leaves_storage_untouched() {
        let raw = r#"[{"id":"0190a000-0000-7000-8000-000000000001","description":"later","date":"2025-07-01","time":"10:00","priority":"Normal","status":"Pending"}]"#;
        let mut store = MemoryStore::new();
        ok(store.set(DEFAULT_KEY, raw.into()), "seed");
        let mut service = TaskService::with_clock(store, DEFAULT_KEY, FixedClock(NOW));

        ok(service.project(&ViewQuery::default()), "project");
        assert_eq!(ok(service.store().get(DEFAULT_KEY), "raw").as_deref(), Some(raw));
    }
}
