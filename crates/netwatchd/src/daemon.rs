//! Watch mode — assembles the watchdog and runs it until interrupted.

use netwatch_core::{DisconnectionEvent, WatchConfig};
use netwatch_health::{
    disconnection_notice, ConnectionTracker, InterfaceCycler, Summary, TcpProbe, Watchdog,
};
use netwatch_history::HistoryStore;
use tokio::sync::watch;
use tracing::{error, info};

/// Run the watchdog until Ctrl-C (or SIGTERM), then print the final status.
pub async fn run(config: WatchConfig) -> anyhow::Result<()> {
    info!("connectivity monitoring starting");

    let history = HistoryStore::open(&config.history.path);
    let probe = TcpProbe::from_config(&config.probe);
    let recovery = InterfaceCycler::from_config(&config.recovery);
    info!(
        probe = %probe.address(),
        interface = %recovery.interface(),
        history = %config.history.path,
        "watchdog configured"
    );

    let mut watchdog = Watchdog::new(Box::new(probe), Box::new(recovery), history)
        .with_interval(config.monitor.interval())
        .with_tracker(ConnectionTracker::with_threshold(
            config.monitor.failure_threshold,
        ))
        .with_callback(Box::new(|event: &DisconnectionEvent, summary: &Summary| {
            println!("\n{}", disconnection_notice(event, summary.total_count));
        }));

    println!("WiFi monitoring started. Press Ctrl+C to stop.");

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    watchdog.run(shutdown_rx).await;

    info!("connectivity monitoring stopped by user");
    println!("\nMonitoring stopped");
    println!("\n{}", watchdog.report());
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
