use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Number of hex characters shown for abbreviated identifiers.
pub const SHORT_ID_LEN: usize = 8;

/// Stable identifier of a task (UUID v7).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct TaskId(pub Uuid);

impl TaskId {
    #[must_use]
    /// Generate a fresh task identifier.
    pub fn new() -> Self {
        // Version 7 keeps creation order visible in the identifier itself.
        Self(Uuid::now_v7())
    }

    /// Abbreviated form used in tables and log lines.
    ///
    /// Taken from the random tail; the leading characters of a v7 id only
    /// change once a minute.
    #[must_use]
    pub fn short(&self) -> String {
        let full = self.to_string();
        full[full.len() - SHORT_ID_LEN..].to_owned()
    }

    /// Whether `token` abbreviates this id: a prefix of the hyphenated form,
    /// or a suffix such as [`TaskId::short`]. Case-insensitive.
    #[must_use]
    pub fn matches_abbreviation(&self, token: &str) -> bool {
        let token = token.trim().to_ascii_lowercase();
        if token.is_empty() {
            return false;
        }
        let full = self.to_string();
        full.starts_with(&token) || full.ends_with(&token)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Serialize for TaskId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
