//! State store - persistence of snapshots to per-port JSON files
//!
//! Losing durability must never interrupt a live session: every failure at
//! this boundary is logged and swallowed. Writes are atomic (temp file +
//! rename) so the file is never observed in a partial state.

use crate::descriptor::Applet;
use crate::paths;
use crate::state::{self, Snapshot, StateMeta, LAST_UPDATED};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Write data to a file atomically using temp file + rename.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)
}

/// Persists and reloads snapshots for one state file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store keyed by explicit port: two processes with different explicit
    /// ports never collide. No explicit port uses the shared file.
    pub fn for_port(explicit_port: Option<u16>) -> Self {
        Self {
            path: paths::state_file_path(&paths::state_dir(), explicit_port),
        }
    }

    /// Store at an arbitrary path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize a snapshot to the state file. Overwrites any previous
    /// content.
    pub fn save(&self, snapshot: &Snapshot) -> io::Result<()> {
        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        atomic_write(&self.path, content.as_bytes())
    }

    /// Best-effort save: failures are logged, never propagated.
    pub fn persist(&self, snapshot: &Snapshot) {
        if let Err(err) = self.save(snapshot) {
            warn!("failed to persist state to {}: {}", self.path.display(), err);
        }
    }

    /// Read the state file if present. A missing file is not an error; any
    /// other failure is logged and treated as "no saved state".
    pub fn load(&self) -> Option<Snapshot> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "no state file at {} yet, starting from defaults",
                    self.path.display()
                );
                return None;
            }
            Err(err) => {
                warn!("failed to read state from {}: {}", self.path.display(), err);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(
                    "ignoring unparseable state file {}: {}",
                    self.path.display(),
                    err
                );
                None
            }
        }
    }

    /// Seed a freshly constructed instance from the state file, applied as a
    /// patch so unknown keys are dropped. `lastUpdated` is carried over from
    /// the file when parseable; `serverStarted` always reflects this process.
    pub fn seed(&self, applet: &mut dyn Applet, meta: &mut StateMeta) {
        let Some(snapshot) = self.load() else {
            return;
        };

        let patch: serde_json::Map<String, Value> = snapshot
            .fields()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let applied = state::apply_update(applet, meta, &patch);
        debug!(
            "seeded {} field(s) from {}",
            applied.len(),
            self.path.display()
        );

        if let Some(Value::String(stamp)) = snapshot.get(LAST_UPDATED) {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(stamp) {
                meta.last_updated = parsed.with_timezone(&Utc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Descriptor, ValueKind};
    use crate::state::extract_state;
    use serde_json::json;

    struct Sample {
        message: String,
        descriptor: Descriptor,
    }

    impl Sample {
        fn new() -> Self {
            Self {
                message: "default".to_string(),
                descriptor: Descriptor::new("sample").field("message", ValueKind::String),
            }
        }
    }

    impl Applet for Sample {
        fn descriptor(&self) -> &Descriptor {
            &self.descriptor
        }

        fn get(&self, field: &str) -> Option<Value> {
            (field == "message").then(|| json!(self.message))
        }

        fn set(&mut self, field: &str, value: Value) -> bool {
            if field == "message" {
                self.message = value.as_str().unwrap_or_default().to_string();
                true
            } else {
                false
            }
        }

        fn invoke(&mut self, _operation: &str, _args: Vec<Value>) -> Result<Value, String> {
            Err("no operations".to_string())
        }
    }

    #[test]
    fn round_trip_reproduces_field_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path().join("state.json"));

        let mut sample = Sample::new();
        sample.message = "persisted".to_string();
        let meta = StateMeta::new();
        store.save(&extract_state(&sample, &meta)).unwrap();

        let mut fresh = Sample::new();
        let mut fresh_meta = StateMeta::new();
        store.seed(&mut fresh, &mut fresh_meta);

        assert_eq!(fresh.message, "persisted");
        assert_eq!(fresh_meta.last_updated, meta.last_updated);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path().join("absent.json"));
        assert!(store.load().is_none());

        let mut sample = Sample::new();
        store.seed(&mut sample, &mut StateMeta::new());
        assert_eq!(sample.message, "default");
    }

    #[test]
    fn corrupt_file_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let store = StateStore::at(&path);
        assert!(store.load().is_none());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path().join("nested/deeper/state.json"));
        let sample = Sample::new();
        store.save(&extract_state(&sample, &StateMeta::new())).unwrap();
        assert!(store.path().exists());
    }
}
