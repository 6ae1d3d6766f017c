//! netwatch-health — connectivity watchdog core.
//!
//! Turns a stream of noisy reachability probes into a debounced
//! connected/disconnected state, cycles the network interface on a
//! confirmed outage, and records each new outage in the history store.
//!
//! # Architecture
//!
//! ```text
//! Watchdog
//!   ├── Probe (TcpProbe)            → reachable: bool
//!   ├── ConnectionTracker           → Verdict per tick
//!   ├── HistoryStore                ← one event per outage
//!   └── Recovery (InterfaceCycler)  → success: bool
//! ```
//!
//! # Recovery policy
//!
//! Two consecutive failed probes confirm an outage. Recovery is retried on
//! every tick for as long as the outage lasts, with no backoff and no cap.
//! A successful recovery is trusted without re-probing.

pub mod checker;
pub mod monitor;
pub mod recovery;
pub mod status;
pub mod tracker;

pub use checker::{tcp_probe, Probe, TcpProbe};
pub use monitor::{DisconnectCallback, TickOutcome, Watchdog};
pub use recovery::{InterfaceCycler, Recovery};
pub use status::{disconnection_notice, summary, StatusReport, Summary};
pub use tracker::{ConnectionTracker, Verdict};
