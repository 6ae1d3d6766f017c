//! Domain types shared across netwatch crates.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

/// A confirmed loss of connectivity, as persisted in the history file.
///
/// The timestamp is fixed at creation. `reconnected` is always written
/// `false`; history is append-only and records are never revisited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisconnectionEvent {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Local>,
    #[serde(default)]
    pub reconnected: bool,
}

impl DisconnectionEvent {
    /// Create an event detected at the given instant.
    pub fn new(timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            reconnected: false,
        }
    }

    /// Create an event detected right now.
    pub fn now() -> Self {
        Self::new(Local::now())
    }
}

/// Debounced connectivity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Connected,
    Disconnected,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Connected => f.write_str("connected"),
            LinkState::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// Parse an ISO-8601 timestamp.
///
/// RFC 3339 strings keep their offset. Offset-less strings such as
/// `2024-03-01T08:15:00.123456` are read as local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Local));
    }
    let naive: NaiveDateTime = raw.parse().ok()?;
    Local.from_local_datetime(&naive).earliest()
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}
