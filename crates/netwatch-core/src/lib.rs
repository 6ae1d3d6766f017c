//! netwatch-core — shared types and configuration for the netwatch watchdog.
//!
//! Holds the persisted [`DisconnectionEvent`] record, the explicit
//! [`LinkState`] enum used by the state machine, and the `netwatch.toml`
//! configuration model with its built-in defaults.

pub mod config;
pub mod types;

pub use config::{parse_duration, ConfigError, WatchConfig};
pub use types::{DisconnectionEvent, LinkState};
