//! New-activity detection for notification delivery.
//!
//! Delivery itself (banner, push, email) belongs to the consumer; this
//! module only answers "is this event new relative to the last-seen
//! marker". The marker lives behind the [`MarkerStore`] trait so the
//! comparison never reads global state directly.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::Result;
use crate::types::ActivityEvent;

/// Marker key under which the last-seen event id is stored.
pub const LAST_SEEN_EVENT_KEY: &str = "last_seen_event_id";

/// Minimal key-value persistence for notification markers.
pub trait MarkerStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Whether an event id is new relative to the last-seen marker.
pub fn is_new_event(latest_id: i64, last_seen: Option<i64>) -> bool {
    match last_seen {
        Some(seen) => latest_id > seen,
        None => true,
    }
}

/// The newest event not yet covered by the store's marker, if any.
pub fn latest_unseen<'a>(
    events: &'a [ActivityEvent],
    store: &dyn MarkerStore,
) -> Option<&'a ActivityEvent> {
    let last_seen = store
        .get(LAST_SEEN_EVENT_KEY)
        .and_then(|v| v.parse::<i64>().ok());
    events
        .iter()
        .max_by_key(|e| e.id)
        .filter(|e| is_new_event(e.id, last_seen))
}

/// Advance the marker to the given event id.
pub fn mark_seen(store: &mut dyn MarkerStore, event_id: i64) -> Result<()> {
    store.set(LAST_SEEN_EVENT_KEY, &event_id.to_string())
}

/// In-memory marker store for tests and single-shot invocations.
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    values: HashMap<String, String>,
}

impl MarkerStore for MemoryMarkerStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Marker store persisted as a small JSON map on disk.
///
/// This is the terminal analogue of the browser's localStorage marker: it
/// survives restarts so the watch loop does not re-announce old events.
#[derive(Debug)]
pub struct FileMarkerStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileMarkerStore {
    /// Open the marker file, creating an empty store if it does not exist.
    pub fn open(path: PathBuf) -> Result<Self> {
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl MarkerStore for FileMarkerStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }
}
