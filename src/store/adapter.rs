use rand::Rng;
use serde_json::Value;
use tracing::{info, warn};

use crate::practice::question::{DrillQuestion, QuestionBanks};
use crate::store::kv::KeyValueStore;
use crate::store::legacy::{LEGACY_VERSION, upgrade_legacy};
use crate::store::schema::{PersistedSnapshot, SCHEMA_VERSION, snapshot_from_value};

/// Mirrors drill snapshots into a key-value store under one fixed key.
pub struct PersistenceAdapter<S> {
    store: S,
    key: &'static str,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(store: S, key: &'static str) -> Self {
        Self { store, key }
    }

    /// Returns `None` when nothing is stored, the JSON is malformed, or the
    /// version is unknown. Legacy snapshots come back upgraded, with `rng`
    /// shuffling any scheme they did not record.
    pub fn load<Q: DrillQuestion, R: Rng + ?Sized>(
        &self,
        banks: &QuestionBanks<Q>,
        rng: &mut R,
    ) -> Option<PersistedSnapshot<Q>> {
        let raw = self.store.get_item(self.key)?;
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = self.key, error = %e, "stored snapshot is not valid JSON");
                return None;
            }
        };

        match value.get("version").and_then(Value::as_u64) {
            Some(v) if v == u64::from(SCHEMA_VERSION) => snapshot_from_value(&value, banks),
            Some(LEGACY_VERSION) => {
                info!(key = self.key, "upgrading legacy snapshot");
                upgrade_legacy(&value, banks, rng)
            }
            other => {
                warn!(key = self.key, version = ?other, "unrecognised snapshot version");
                None
            }
        }
    }

    /// Best effort: a failed write is logged and otherwise ignored.
    pub fn save<Q: DrillQuestion>(&mut self, snapshot: &PersistedSnapshot<Q>) {
        let json = match serde_json::to_string(snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = self.key, error = %e, "failed to serialise snapshot");
                return;
            }
        };
        if let Err(e) = self.store.set_item(self.key, &json) {
            warn!(key = self.key, error = %e, "failed to persist snapshot");
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
