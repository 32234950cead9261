//! State model - snapshot extraction and patch application
//!
//! A snapshot is the serializable view of an application instance at a point
//! in time: every declared field's current value plus two derived metadata
//! keys. Extraction is deterministic and side-effect free. All mutation goes
//! through [`apply_update`]; direct field assignment outside that entry point
//! is not part of the contract.

use crate::descriptor::Applet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Wire/disk key for the daemon start timestamp.
pub const SERVER_STARTED: &str = "serverStarted";

/// Wire/disk key for the last mutation timestamp.
pub const LAST_UPDATED: &str = "lastUpdated";

/// Framework-internal names that never enter a snapshot, even if an
/// application declares them.
pub const EXCLUDED_FIELDS: &[&str] = &["schema", "logPrefix", "server", "devMode"];

pub fn is_excluded(name: &str) -> bool {
    EXCLUDED_FIELDS.contains(&name)
}

pub fn is_meta_key(name: &str) -> bool {
    name == SERVER_STARTED || name == LAST_UPDATED
}

/// Timestamps owned by the framework, not by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMeta {
    pub server_started: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl StateMeta {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            server_started: now,
            last_updated: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

impl Default for StateMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time state view: declared fields plus metadata keys, ordered
/// for stable serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(pub BTreeMap<String, Value>);

impl Snapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or(Value::Null)
    }

    /// Field entries only, metadata keys excluded.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(k, _)| !is_meta_key(k))
    }

    /// Structural diff against a proposed update: the subset of proposed
    /// entries whose value differs (deep equality) from the current one.
    /// Metadata keys are never part of a patch.
    pub fn diff(&self, proposed: &Map<String, Value>) -> Map<String, Value> {
        let mut patch = Map::new();
        for (key, value) in proposed {
            if is_meta_key(key) {
                continue;
            }
            if self.0.get(key.as_str()) != Some(value) {
                patch.insert(key.clone(), value.clone());
            }
        }
        patch
    }

    /// Whether the field values (metadata aside) match another snapshot.
    pub fn fields_equal(&self, other: &Snapshot) -> bool {
        self.fields().eq(other.fields())
    }
}

/// Derive the current snapshot from an instance. Walks the declared fields,
/// skipping the fixed exclusion set; operations never appear because the
/// descriptor keeps them separate from fields.
pub fn extract_state(applet: &dyn Applet, meta: &StateMeta) -> Snapshot {
    let mut map = BTreeMap::new();

    for field in &applet.descriptor().fields {
        if is_excluded(&field.name) || is_meta_key(&field.name) {
            continue;
        }
        if let Some(value) = applet.get(&field.name) {
            map.insert(field.name.clone(), value);
        }
    }

    map.insert(
        SERVER_STARTED.to_string(),
        Value::String(meta.server_started.to_rfc3339()),
    );
    map.insert(
        LAST_UPDATED.to_string(),
        Value::String(meta.last_updated.to_rfc3339()),
    );

    Snapshot(map)
}

/// Apply a patch to an instance. Keys the descriptor does not declare are
/// silently dropped; this protects against unexpected or forged fields.
/// Stamps `lastUpdated` when at least one field was written. Returns the
/// names that were applied. Persistence is the caller's concern.
pub fn apply_update(
    applet: &mut dyn Applet,
    meta: &mut StateMeta,
    patch: &Map<String, Value>,
) -> Vec<String> {
    let mut applied = Vec::new();

    for (key, value) in patch {
        if is_meta_key(key) || is_excluded(key) {
            continue;
        }
        if !applet.descriptor().has_field(key) {
            tracing::debug!("dropping unknown field '{}' from update", key);
            continue;
        }
        if applet.set(key, value.clone()) {
            applied.push(key.clone());
        }
    }

    if !applied.is_empty() {
        meta.touch();
    }

    applied
}
