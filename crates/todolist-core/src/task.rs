//! The task entity and its closed vocabularies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

use crate::error::ParseError;
use crate::id::TaskId;

/// How pressing a task is.
///
/// Stored records may spell it loosely (`"Normal"`, `"not-urgent"`); blank means `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Priority {
    /// Needs attention first.
    #[serde(rename = "urgent")]
    Urgent,
    /// The default priority.
    #[default]
    #[serde(rename = "normal")]
    Normal,
    /// Can wait.
    #[serde(rename = "not urgent")]
    NotUrgent,
}

impl Priority {
    /// Every priority in rank order.
    pub const ALL: [Self; 3] = [Self::Urgent, Self::Normal, Self::NotUrgent];

    /// Persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Normal => "normal",
            Self::NotUrgent => "not urgent",
        }
    }

    /// Sort rank: `urgent=1, normal=2, not urgent=3`.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Urgent => 1,
            Self::Normal => 2,
            Self::NotUrgent => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "urgent" => Ok(Self::Urgent),
            "normal" => Ok(Self::Normal),
            "not_urgent" | "noturgent" => Ok(Self::NotUrgent),
            _ => Err(ParseError::Priority(s.to_owned())),
        }
    }
}

/// Progress of a task. `Overdue` is derived, `Completed` only ever comes from a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Status {
    /// Open and not yet due.
    #[default]
    Pending,
    /// Marked done by the user.
    Completed,
    /// Was pending when its due instant passed.
    Overdue,
}

impl Status {
    /// Every status in rank order.
    pub const ALL: [Self; 3] = [Self::Overdue, Self::Pending, Self::Completed];

    /// Persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
        }
    }

    /// Sort rank: `Overdue=1, Pending=2, Completed=3`.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Overdue => 1,
            Self::Pending => 2,
            Self::Completed => 3,
        }
    }

    /// Status after a user toggle. Never yields `Overdue`.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Completed => Self::Pending,
            Self::Pending | Self::Overdue => Self::Completed,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "overdue" => Ok(Self::Overdue),
            _ => Err(ParseError::Status(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_stored(d)
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_stored(d)
    }
}

fn parse_stored<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = ParseError> + Default,
{
    let raw = String::deserialize(d)?;
    if raw.trim().is_empty() {
        return Ok(T::default());
    }
    raw.parse().map_err(serde::de::Error::custom)
}

pub(crate) fn normalize_token(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

/// A to-do item.
///
/// `date` and `time` are kept as the strings the user entered; [`Task::due`]
/// interprets them. A record without an `id` (older layout) gets a fresh one
/// on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier, the only handle used by mutations.
    #[serde(default = "TaskId::new")]
    pub id: TaskId,
    /// Free-text label.
    #[serde(default)]
    pub description: String,
    /// Due date as `YYYY-MM-DD`.
    #[serde(default)]
    pub date: String,
    /// Due time as `HH:MM`.
    #[serde(default)]
    pub time: String,
    /// Priority chosen at creation.
    #[serde(default)]
    pub priority: Priority,
    /// Current status.
    #[serde(default)]
    pub status: Status,
}

impl Task {
    /// Create a pending task with a fresh identifier.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            id: TaskId::new(),
            description: description.into(),
            date: date.into(),
            time: time.into(),
            priority,
            status: Status::Pending,
        }
    }

    /// Combined due instant, or `None` when either component is malformed.
    #[must_use]
    pub fn due(&self) -> Option<PrimitiveDateTime> {
        let date = Date::parse(self.date.trim(), format_description!("[year]-[month]-[day]")).ok()?;
        let time = parse_clock_time(self.time.trim())?;
        Some(PrimitiveDateTime::new(date, time))
    }

    /// Whether the due instant is strictly before `now`. Invalid instants are never past due.
    #[must_use]
    pub fn is_past_due(&self, now: PrimitiveDateTime) -> bool {
        self.due().is_some_and(|due| due < now)
    }

    /// Move `Pending` to `Overdue` when past due. Returns whether the status changed.
    pub fn refresh_overdue(&mut self, now: PrimitiveDateTime) -> bool {
        if self.status == Status::Pending && self.is_past_due(now) {
            self.status = Status::Overdue;
            return true;
        }
        false
    }

    /// Flip between `Completed` and `Pending`.
    pub fn toggle(&mut self) {
        self.status = self.status.toggled();
    }
}

fn parse_clock_time(raw: &str) -> Option<Time> {
    Time::parse(raw, format_description!("[hour]:[minute]"))
        .or_else(|_| Time::parse(raw, format_description!("[hour]:[minute]:[second]")))
        .ok()
}
