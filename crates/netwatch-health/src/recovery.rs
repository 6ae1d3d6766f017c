//! Interface recovery action.
//!
//! Cycles the network interface with two OS commands: disable, settle,
//! enable, settle. The whole sequence is one opaque step from the state
//! machine's point of view.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use netwatch_core::config::RecoveryConfig;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Boxed future alias for recovery results.
pub type RecoveryFuture<'a> = Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

/// The corrective action run on a confirmed outage — injected for testability.
pub trait Recovery: Send + Sync {
    /// Returns `true` if every step of the action succeeded.
    fn cycle_interface(&self) -> RecoveryFuture<'_>;
}

/// Disables and re-enables an interface via external commands.
#[derive(Debug, Clone)]
pub struct InterfaceCycler {
    interface: String,
    disable: Vec<String>,
    enable: Vec<String>,
    settle_after_disable: Duration,
    settle_after_enable: Duration,
}

impl InterfaceCycler {
    /// Create a cycler with no settle delays.
    pub fn new(interface: impl Into<String>, disable: Vec<String>, enable: Vec<String>) -> Self {
        Self {
            interface: interface.into(),
            disable,
            enable,
            settle_after_disable: Duration::ZERO,
            settle_after_enable: Duration::ZERO,
        }
    }

    pub fn from_config(config: &RecoveryConfig) -> Self {
        Self::new(
            config.interface.clone(),
            config.disable_command(),
            config.enable_command(),
        )
        .with_settle(config.settle_after_disable(), config.settle_after_enable())
    }

    /// Set the waits after the disable and enable commands.
    pub fn with_settle(mut self, after_disable: Duration, after_enable: Duration) -> Self {
        self.settle_after_disable = after_disable;
        self.settle_after_enable = after_enable;
        self
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    async fn cycle(&self) -> bool {
        let interface = self.interface.as_str();

        if !run_command(&self.disable).await {
            error!(%interface, "failed to disable interface");
            return false;
        }
        info!(%interface, "interface turned off");
        tokio::time::sleep(self.settle_after_disable).await;

        if !run_command(&self.enable).await {
            error!(%interface, "failed to enable interface");
            return false;
        }
        info!(%interface, "interface turned on");

        // Give the link time to associate before the next probe.
        tokio::time::sleep(self.settle_after_enable).await;
        true
    }
}

impl Recovery for InterfaceCycler {
    fn cycle_interface(&self) -> RecoveryFuture<'_> {
        Box::pin(self.cycle())
    }
}

/// Run `argv` to completion. Any spawn error or non-zero exit is `false`.
async fn run_command(argv: &[String]) -> bool {
    let Some((program, args)) = argv.split_first() else {
        error!("recovery command is empty");
        return false;
    };

    debug!(command = ?argv, "running recovery command");

    match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
    {
        Ok(output) if output.status.success() => true,
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                command = ?argv,
                status = %output.status,
                stderr = %stderr.trim(),
                "recovery command failed"
            );
            false
        }
        Err(e) => {
            error!(command = ?argv, error = %e, "failed to run recovery command");
            false
        }
    }
}
