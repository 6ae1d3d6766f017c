//! Debounce and recovery state machine.
//!
//! Consumes one probe result per tick and decides whether the link is
//! really down. A single failed probe is noise; `failure_threshold`
//! consecutive failures confirm an outage.

use netwatch_core::LinkState;
use tracing::{info, warn};

/// Consecutive failed probes that confirm an outage by default.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 2;

/// What the watchdog must do after a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The probe succeeded; nothing to do.
    Reachable,
    /// The probe failed but the threshold has not been reached.
    Tolerated,
    /// The threshold was crossed while connected: record the outage, then recover.
    NewOutage,
    /// The outage is already recorded: recover again.
    OngoingOutage,
}

impl Verdict {
    /// Whether the recovery action must run this tick.
    pub fn needs_recovery(self) -> bool {
        matches!(self, Verdict::NewOutage | Verdict::OngoingOutage)
    }
}

/// Tracks the debounced link state and the consecutive failure count.
#[derive(Debug)]
pub struct ConnectionTracker {
    state: LinkState,
    consecutive_failures: u32,
    failure_threshold: u32,
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTracker {
    /// Start optimistic: connected, no failures, threshold of two.
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_FAILURE_THRESHOLD)
    }

    /// A threshold of zero is treated as one.
    pub fn with_threshold(failure_threshold: u32) -> Self {
        Self {
            state: LinkState::Connected,
            consecutive_failures: 0,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Record a probe result.
    pub fn record_probe(&mut self, reachable: bool) -> Verdict {
        if reachable {
            if self.state == LinkState::Disconnected {
                info!(
                    failures = self.consecutive_failures,
                    "connectivity restored"
                );
            }
            self.consecutive_failures = 0;
            self.state = LinkState::Connected;
            return Verdict::Reachable;
        }

        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.consecutive_failures < self.failure_threshold {
            info!(
                failures = self.consecutive_failures,
                threshold = self.failure_threshold,
                "probe failed, tolerating"
            );
            return Verdict::Tolerated;
        }

        match self.state {
            LinkState::Connected => {
                warn!(
                    failures = self.consecutive_failures,
                    threshold = self.failure_threshold,
                    "connectivity lost"
                );
                self.state = LinkState::Disconnected;
                Verdict::NewOutage
            }
            LinkState::Disconnected => Verdict::OngoingOutage,
        }
    }

    /// Record the outcome of a recovery attempt.
    ///
    /// Success is trusted without re-probing. Failure leaves the counter
    /// above the threshold so the next failed probe retries at once.
    pub fn record_recovery(&mut self, success: bool) {
        if success {
            self.consecutive_failures = 0;
            self.state = LinkState::Connected;
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }
}
