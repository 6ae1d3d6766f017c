//! Status reporting.
//!
//! Pure reads over the history store and tracker; nothing here mutates.

use std::fmt;

use chrono::{DateTime, Local};
use netwatch_core::{DisconnectionEvent, LinkState};
use netwatch_history::HistoryStore;
use serde::Serialize;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Totals derived from the disconnection history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_count: usize,
    pub last_disconnection: Option<DateTime<Local>>,
}

/// Summarize the recorded history.
pub fn summary(history: &HistoryStore) -> Summary {
    Summary {
        total_count: history.len(),
        last_disconnection: history.last().map(|e| e.timestamp),
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status Summary:")?;
        write!(f, "Total recorded disconnections: {}", self.total_count)?;
        if let Some(last) = self.last_disconnection {
            write!(f, "\nLast disconnection: {}", last.format(DISPLAY_FORMAT))?;
        }
        Ok(())
    }
}

/// Console notice printed when a new outage is recorded.
pub fn disconnection_notice(event: &DisconnectionEvent, total_count: usize) -> String {
    format!(
        "Disconnection detected at {}\nTotal disconnections: {total_count}",
        event.timestamp.to_rfc3339()
    )
}

/// Live watchdog state plus the history summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub state: LinkState,
    pub consecutive_failures: u32,
    #[serde(flatten)]
    pub summary: Summary,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary)?;
        write!(
            f,
            "Current state: {} ({} consecutive failed probes)",
            self.state, self.consecutive_failures
        )
    }
}
