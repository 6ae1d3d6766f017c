//! netwatch-history — durable log of disconnection events.
//!
//! The history is a single JSON array of [`DisconnectionEvent`] records.
//! It is read once when the store opens and rewritten in full after every
//! append. Neither path ever fails the caller: a missing file is an empty
//! history, a corrupt file is logged and treated as empty, and a failed
//! write is logged while the in-memory sequence stays authoritative.
//!
//! [`DisconnectionEvent`]: netwatch_core::DisconnectionEvent

pub mod error;
pub mod store;

pub use error::{HistoryError, HistoryResult};
pub use store::HistoryStore;
