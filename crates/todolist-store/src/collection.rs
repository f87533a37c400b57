use anyhow::{Context, Result};
use serde_json::Value;
use todolist_core::Task;
use tracing::{debug, warn};

use crate::KeyValueStore;

/// Key the task collection is stored under unless configured otherwise.
pub const DEFAULT_KEY: &str = "todos";

/// The whole task collection, serialized as one JSON array under one key.
///
/// Reads always return the full collection and writes always replace it.
#[derive(Debug)]
pub struct TaskCollection<S> {
    store: S,
    key: String,
}

impl<S> TaskCollection<S> {
    /// Wrap `store`, keeping the collection under `key`.
    #[must_use]
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}

/// Result of reading the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedTasks {
    /// Readable tasks in stored order.
    pub tasks: Vec<Task>,
    /// How many of `tasks` had no stored `id` and received a fresh one.
    pub assigned_ids: usize,
    /// Array entries that could not be read as tasks. They are kept in storage.
    pub unreadable: usize,
}

impl<S: KeyValueStore> TaskCollection<S> {
    /// Load every readable task in stored order.
    ///
    /// # Errors
    /// Returns an error only when the store itself cannot be read.
    pub fn load(&self) -> Result<Vec<Task>> {
        self.load_detailed().map(|loaded| loaded.tasks)
    }

    /// Load the collection along with what decoding had to repair or skip.
    ///
    /// An absent value and a value that is not a JSON array both load as "no
    /// task", with a warning for the latter.
    ///
    /// # Errors
    /// Returns an error only when the store itself cannot be read.
    pub fn load_detailed(&self) -> Result<LoadedTasks> {
        let Some(raw) = self.read_raw()? else {
            debug!(key = %self.key, "no stored collection");
            return Ok(LoadedTasks::default());
        };
        Ok(decode(&self.key, &raw))
    }

    /// Replace the persisted tasks with `tasks`.
    ///
    /// Stored entries that cannot be read as tasks are written back unchanged
    /// after `tasks`.
    ///
    /// # Errors
    /// Returns an error if serialization or a store access fails.
    pub fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let retained = self
            .read_raw()?
            .map(|raw| unreadable_entries(&raw))
            .unwrap_or_default();

        let mut entries = tasks
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .context("failed to serialize tasks")?;
        let kept = retained.len();
        entries.extend(retained);

        let body = serde_json::to_string(&entries).context("failed to serialize tasks")?;
        self.store
            .set(&self.key, body)
            .map_err(Into::<anyhow::Error>::into)
            .with_context(|| format!("failed to write key {}", self.key))?;
        debug!(key = %self.key, count = tasks.len(), kept, "collection saved");
        Ok(())
    }

    fn read_raw(&self) -> Result<Option<String>> {
        self.store
            .get(&self.key)
            .map_err(Into::<anyhow::Error>::into)
            .with_context(|| format!("failed to read key {}", self.key))
    }
}

fn parse_entries(key: &str, raw: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(Value::Null) => Vec::new(),
        Ok(other) => {
            warn!(key, kind = json_kind(&other), "stored collection is not an array, ignoring it");
            Vec::new()
        }
        Err(err) => {
            warn!(key, %err, "stored collection is not valid JSON, ignoring it");
            Vec::new()
        }
    }
}

fn decode(key: &str, raw: &str) -> LoadedTasks {
    let mut loaded = LoadedTasks::default();
    for (idx, entry) in parse_entries(key, raw).into_iter().enumerate() {
        let has_id = entry.get("id").is_some();
        match serde_json::from_value::<Task>(entry) {
            Ok(task) => {
                if !has_id {
                    loaded.assigned_ids += 1;
                }
                loaded.tasks.push(task);
            }
            Err(err) => {
                warn!(key, idx, %err, "unreadable task record left in place");
                loaded.unreadable += 1;
            }
        }
    }
    loaded
}

fn unreadable_entries(raw: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries
            .into_iter()
            .filter(|entry| serde_json::from_value::<Task>(entry.clone()).is_err())
            .collect(),
        _ => Vec::new(),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
