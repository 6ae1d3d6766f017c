//! HistoryStore — append-only disconnection history persisted as JSON.
//!
//! The on-disk format is a flat, versionless array:
//!
//! ```json
//! [{"timestamp":"2024-03-01T08:15:00.123+01:00","reconnected":false}]
//! ```
//!
//! Saves write the whole array to a sibling `.tmp` file and rename it over
//! the target, so a reader never observes a half-written history.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use netwatch_core::DisconnectionEvent;
use tracing::{debug, error, info};

use crate::error::{HistoryError, HistoryResult};

#[derive(Debug)]
enum Backend {
    File(PathBuf),
    /// Nothing is persisted (for testing).
    Memory,
}

/// Owns the ordered event sequence and is the only writer of its file.
#[derive(Debug)]
pub struct HistoryStore {
    backend: Backend,
    events: Vec<DisconnectionEvent>,
}

impl HistoryStore {
    /// Open the history at `path`, loading any events already recorded.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let events = load(&path);
        info!(path = %path.display(), count = events.len(), "disconnection history loaded");
        Self {
            backend: Backend::File(path),
            events,
        }
    }

    /// Create an ephemeral store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory,
            events: Vec::new(),
        }
    }

    /// Append an event and rewrite the backing file.
    ///
    /// A write failure is logged; the event stays in memory regardless.
    pub fn append_and_save(&mut self, event: DisconnectionEvent) {
        self.events.push(event);
        if let Err(e) = self.save() {
            error!(error = %e, "error saving disconnection history");
        }
    }

    fn save(&self) -> HistoryResult<()> {
        match &self.backend {
            Backend::File(path) => {
                write_atomic(path, &self.events)?;
                debug!(path = %path.display(), count = self.events.len(), "disconnection history saved");
                Ok(())
            }
            Backend::Memory => Ok(()),
        }
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> &[DisconnectionEvent] {
        &self.events
    }

    /// Total number of recorded disconnections.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The most recent event, if any.
    pub fn last(&self) -> Option<&DisconnectionEvent> {
        self.events.last()
    }

}

/// Load the history at `path`, degrading to an empty sequence.
///
/// A missing file is a normal first start. An unreadable or corrupt file
/// is logged and discarded.
pub fn load(path: &Path) -> Vec<DisconnectionEvent> {
    match try_load(path) {
        Ok(events) => events,
        Err(e) => {
            error!(error = %e, "error loading disconnection history");
            Vec::new()
        }
    }
}

/// Load the history at `path`, reporting why it could not be read.
pub fn try_load(path: &Path) -> HistoryResult<Vec<DisconnectionEvent>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no disconnection history yet");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(HistoryError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    serde_json::from_slice(&bytes).map_err(|e| HistoryError::Deserialize {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_atomic(path: &Path, events: &[DisconnectionEvent]) -> HistoryResult<()> {
    let write_err = |source| HistoryError::Write {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_vec(events).map_err(|e| HistoryError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp = tmp_path(path);
    let written = fs::File::create(&tmp).and_then(|mut file| {
        file.write_all(&json)?;
        file.sync_all()
    });
    if let Err(source) = written.and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(source));
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, Local};

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Run `f` with log output captured.
    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, logs.contents())
    }

    fn events(n: usize) -> Vec<DisconnectionEvent> {
        let start = Local::now();
        (0..n)
            .map(|i| DisconnectionEvent::new(start + Duration::seconds(i as i64 * 30)))
            .collect()
    }

    #[test]
    fn missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("history.json"));
        assert!(store.is_empty());
        assert!(store.last().is_none());
    }

    #[test]
    fn append_then_reload_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let recorded = events(3);

        let mut store = HistoryStore::open(&path);
        for event in &recorded {
            store.append_and_save(event.clone());
        }
        assert_eq!(store.len(), 3);

        let reopened = HistoryStore::open(&path);
        assert_eq!(reopened.events(), recorded.as_slice());
        assert_eq!(reopened.last(), recorded.last());
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut store = HistoryStore::open(&path);
        store.append_and_save(DisconnectionEvent::now());

        assert!(path.exists());
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("netwatch").join("history.json");
        let mut store = HistoryStore::open(&path);
        store.append_and_save(DisconnectionEvent::now());

        assert_eq!(try_load(&path).unwrap().len(), 1);
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "[{\"timestamp\": ").unwrap();

        assert!(matches!(try_load(&path), Err(HistoryError::Deserialize { .. })));
        let (store, logs) = with_captured_logs(|| HistoryStore::open(&path));
        assert!(store.is_empty());
        assert!(logs.contains("ERROR"), "{logs}");
        assert!(logs.contains("error loading disconnection history"), "{logs}");
    }

    #[test]
    fn wrong_shape_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, r#"{"timestamp": "2024-01-01T00:00:00Z"}"#).unwrap();

        assert!(load(&path).is_empty());
    }

    #[test]
    fn missing_file_logs_no_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let (store, logs) = with_captured_logs(|| HistoryStore::open(&path));
        assert!(store.is_empty());
        assert!(!logs.contains("ERROR"), "{logs}");
    }

    #[test]
    fn blank_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "\n").unwrap();

        assert!(try_load(&path).unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_replaced_on_next_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "garbage").unwrap();

        let mut store = HistoryStore::open(&path);
        store.append_and_save(DisconnectionEvent::now());

        assert_eq!(try_load(&path).unwrap().len(), 1);
    }

    #[test]
    fn legacy_records_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(
            &path,
            r#"[{"timestamp": "2023-11-05T22:01:13.500000", "reconnected": false},
               {"timestamp": "2023-11-06T07:45:02.000001", "reconnected": false}]"#,
        )
        .unwrap();

        let store = HistoryStore::open(&path);
        assert_eq!(store.len(), 2);
        assert!(store.events()[0].timestamp < store.events()[1].timestamp);
    }

    #[test]
    fn write_failure_keeps_event_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory where the file should be makes the rename fail.
        let path = dir.path().join("history.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        let mut store = HistoryStore::open(&path);
        store.append_and_save(DisconnectionEvent::now());
        store.append_and_save(DisconnectionEvent::now());

        assert_eq!(store.len(), 2);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn in_memory_store_keeps_events() {
        let mut store = HistoryStore::in_memory();
        store.append_and_save(DisconnectionEvent::now());
        assert_eq!(store.len(), 1);
        assert!(matches!(store.backend, Backend::Memory));
    }
}
