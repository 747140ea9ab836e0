//! Bridge between the live document and the host key-value store.
//!
//! Persistence is best-effort. Nothing in here returns an error to the
//! caller: unreadable data reads as absent, failed writes are logged, and
//! without a backend every operation is a no-op. The in-memory document stays
//! authoritative for the session.

use serde_json::Value;
use std::sync::Arc;

use super::kv::{FileStore, KeyValueStore};
use super::transfer::{self, ExportArtifact};
use crate::config::CoreConfig;
use crate::constants::{BACKUP_STORAGE_KEY, CURRENT_SCHEMA_VERSION, STORAGE_KEY};
use crate::migration::{self, MigrationError};
use crate::models::AppState;
use crate::schema::{self, SchemaViolation};

/// Result of the most recent write, kept for status displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// No storage backend
    Skipped,
    Failed,
}

/// Why a persisted document could not become the live document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Schema(#[from] SchemaViolation),
}

/// Run a raw persisted document through migration and strict validation
pub fn hydrate(raw: Value) -> Result<AppState, LoadError> {
    let migrated = migration::migrate(raw)?;
    Ok(schema::validate_app_state(migrated)?)
}

/// Serialize a document with `version` stamped to the current schema version
pub(crate) fn document_value(state: &AppState) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(state)?;
    if let Value::Object(map) = &mut value {
        map.insert("version".to_string(), Value::from(CURRENT_SCHEMA_VERSION));
    }
    Ok(value)
}

#[derive(Clone)]
pub struct Persistence {
    backend: Option<Arc<dyn KeyValueStore>>,
    key: String,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("available", &self.is_available())
            .field("key", &self.key)
            .finish()
    }
}

impl Persistence {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend: Some(backend),
            key: key.into(),
        }
    }

    /// No storage backend: every operation is a no-op
    pub fn unavailable() -> Self {
        Self {
            backend: None,
            key: STORAGE_KEY.to_string(),
        }
    }

    /// File-backed persistence in `config.data_dir`.
    /// Falls back to [`Persistence::unavailable`] if the directory cannot be created.
    pub fn from_config(config: &CoreConfig) -> Self {
        match FileStore::new(&config.data_dir) {
            Ok(store) => Self::with_key(Arc::new(store), config.storage_key.clone()),
            Err(e) => {
                tracing::warn!(
                    data_dir = %config.data_dir.display(),
                    error = %e,
                    "storage unavailable; changes will not be persisted"
                );
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw persisted document, or `None` when unset, unreadable or not JSON.
    /// Text that is not JSON is copied to the backup key first.
    pub fn load(&self) -> Option<Value> {
        let backend = self.backend.as_ref()?;
        let stored = match backend.get(&self.key) {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to read persisted document");
                return None;
            }
        };
        match serde_json::from_str(&stored) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "persisted document is not valid JSON");
                self.backup_text(&stored);
                None
            }
        }
    }

    pub fn save(&self, state: &AppState) -> SaveOutcome {
        let Some(backend) = self.backend.as_ref() else {
            return SaveOutcome::Skipped;
        };
        let serialized = match document_value(state).and_then(|v| serde_json::to_string(&v)) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize document");
                return SaveOutcome::Failed;
            }
        };
        match backend.set(&self.key, &serialized) {
            Ok(()) => {
                tracing::debug!(key = %self.key, bytes = serialized.len(), "document saved");
                SaveOutcome::Saved
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to save document");
                SaveOutcome::Failed
            }
        }
    }

    pub fn clear(&self) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        if let Err(e) = backend.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "failed to clear persisted document");
        }
    }

    /// Keep a copy of a document that could not be loaded before it is overwritten
    pub fn backup(&self, raw: &Value) {
        match serde_json::to_string(raw) {
            Ok(text) => self.backup_text(&text),
            Err(e) => tracing::warn!(error = %e, "failed to serialize unreadable document"),
        }
    }

    fn backup_text(&self, text: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        let key = self.backup_key();
        match backend.set(&key, text) {
            Ok(()) => tracing::info!(key = %key, "backed up unreadable document"),
            Err(e) => tracing::warn!(key = %key, error = %e, "failed to back up unreadable document"),
        }
    }

    pub fn backup_key(&self) -> String {
        if self.key == STORAGE_KEY {
            BACKUP_STORAGE_KEY.to_string()
        } else {
            format!("{}.bak", self.key)
        }
    }

    /// Export file for `state`; does not touch storage
    pub fn export_json(&self, state: &AppState) -> Result<ExportArtifact, serde_json::Error> {
        transfer::export_json(state, crate::clock::now())
    }
}
