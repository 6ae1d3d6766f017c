//! Restart regression tests.
//!
//! Validates that disconnection history written by one watchdog run is
//! picked up by the next, and that a damaged history file never stops
//! the watchdog from starting.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use netwatch_core::{LinkState, WatchConfig};
use netwatch_health::{summary, Probe, Recovery, Watchdog};
use netwatch_history::HistoryStore;
use tokio::sync::watch;

struct Script(Mutex<VecDeque<bool>>);

impl Script {
    fn new(results: &[bool]) -> Self {
        Self(Mutex::new(results.iter().copied().collect()))
    }
}

impl Probe for Script {
    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let next = self.0.lock().unwrap().pop_front().unwrap_or(true);
        Box::pin(async move { next })
    }
}

struct Always(bool);

impl Recovery for Always {
    fn cycle_interface(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let ok = self.0;
        Box::pin(async move { ok })
    }
}

fn watchdog(history: HistoryStore, probes: &[bool]) -> Watchdog {
    Watchdog::new(Box::new(Script::new(probes)), Box::new(Always(true)), history)
}

#[tokio::test]
async fn history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disconnection_history.json");

    // First run: one outage.
    let mut first = watchdog(HistoryStore::open(&path), &[true, false, false, true]);
    for _ in 0..4 {
        first.tick().await;
    }
    assert_eq!(first.history().len(), 1);
    drop(first);

    // Second run: picks up where the first left off.
    let mut second = watchdog(HistoryStore::open(&path), &[false, false]);
    assert_eq!(second.report().summary.total_count, 1);
    second.tick().await;
    second.tick().await;

    let reloaded = HistoryStore::open(&path);
    let s = summary(&reloaded);
    assert_eq!(s.total_count, 2);
    assert_eq!(s.last_disconnection, reloaded.last().map(|e| e.timestamp));
    assert!(reloaded.events()[0].timestamp <= reloaded.events()[1].timestamp);
    assert!(reloaded.events().iter().all(|e| !e.reconnected));
}

#[tokio::test]
async fn corrupt_history_starts_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disconnection_history.json");
    std::fs::write(&path, "{{{ definitely not json").unwrap();

    let mut wd = watchdog(HistoryStore::open(&path), &[false, false]);
    let report = wd.report();
    assert_eq!(report.summary.total_count, 0);
    assert_eq!(report.summary.last_disconnection, None);

    wd.tick().await;
    wd.tick().await;
    assert_eq!(HistoryStore::open(&path).len(), 1);
}

#[tokio::test]
async fn default_config_watchdog_shuts_down_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = WatchConfig::default();
    config.history.path = dir
        .path()
        .join("disconnection_history.json")
        .to_string_lossy()
        .into_owned();
    config.monitor.interval = "10ms".to_string();
    config.validate().unwrap();

    let mut wd = watchdog(HistoryStore::open(&config.history.path), &[])
        .with_interval(config.monitor.interval());

    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        wd.run(rx).await;
        wd
    });
    tokio::time::sleep(Duration::from_millis(60)).await;
    tx.send(true).unwrap();

    let wd = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("watchdog did not stop")
        .unwrap();
    assert_eq!(wd.report().state, LinkState::Connected);
    assert!(wd.history().is_empty());
}
