//! Watchdog — the polling loop that ties probe, tracker, history, and
//! recovery together.
//!
//! Ticks are strictly sequential: probe, decide, record, recover, then
//! sleep for the polling interval. Both the tick and the sleep race the
//! shutdown channel, so an interrupt is serviced promptly and any
//! in-flight probe or recovery is simply abandoned.

use std::time::Duration;

use netwatch_core::DisconnectionEvent;
use netwatch_history::HistoryStore;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::checker::Probe;
use crate::recovery::Recovery;
use crate::status::{summary, StatusReport, Summary};
use crate::tracker::{ConnectionTracker, Verdict};

/// Default time between polling ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Callback invoked after a new disconnection has been recorded.
pub type DisconnectCallback = Box<dyn Fn(&DisconnectionEvent, &Summary) + Send + Sync>;

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub verdict: Verdict,
    /// Result of the recovery action, if it ran.
    pub recovered: Option<bool>,
}

/// Single-link connectivity watchdog.
pub struct Watchdog {
    probe: Box<dyn Probe>,
    recovery: Box<dyn Recovery>,
    tracker: ConnectionTracker,
    history: HistoryStore,
    interval: Duration,
    on_disconnect: Option<DisconnectCallback>,
}

impl Watchdog {
    pub fn new(probe: Box<dyn Probe>, recovery: Box<dyn Recovery>, history: HistoryStore) -> Self {
        Self {
            probe,
            recovery,
            tracker: ConnectionTracker::new(),
            history,
            interval: DEFAULT_INTERVAL,
            on_disconnect: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_tracker(mut self, tracker: ConnectionTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Set a callback for newly recorded disconnections.
    pub fn with_callback(mut self, callback: DisconnectCallback) -> Self {
        self.on_disconnect = Some(callback);
        self
    }

    /// Run one polling step.
    pub async fn tick(&mut self) -> TickOutcome {
        let reachable = self.probe.probe().await;
        let verdict = self.tracker.record_probe(reachable);

        if verdict == Verdict::NewOutage {
            self.record_disconnection();
        }

        if !verdict.needs_recovery() {
            return TickOutcome {
                verdict,
                recovered: None,
            };
        }

        info!(
            failures = self.tracker.consecutive_failures(),
            "attempting to reset network interface"
        );
        let recovered = self.recovery.cycle_interface().await;
        self.tracker.record_recovery(recovered);

        if recovered {
            info!("network interface reset completed");
        } else {
            error!("network interface reset failed, retrying next tick");
        }

        TickOutcome {
            verdict,
            recovered: Some(recovered),
        }
    }

    fn record_disconnection(&mut self) {
        let event = DisconnectionEvent::now();
        self.history.append_and_save(event.clone());
        warn!(
            timestamp = %event.timestamp.to_rfc3339(),
            total = self.history.len(),
            "disconnection recorded"
        );

        if let Some(ref cb) = self.on_disconnect {
            cb(&event, &summary(&self.history));
        }
    }

    /// Poll until the shutdown channel flips to `true` or its sender drops.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            threshold = self.tracker.failure_threshold(),
            "monitoring started"
        );

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            tokio::select! {
                outcome = self.tick() => {
                    debug!(?outcome, state = %self.tracker.state(), "tick complete");
                }
                _ = shutdown.changed() => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("monitoring stopped");
    }

    /// Current state plus the history summary.
    pub fn report(&self) -> StatusReport {
        StatusReport {
            state: self.tracker.state(),
            consecutive_failures: self.tracker.consecutive_failures(),
            summary: summary(&self.history),
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }
}
