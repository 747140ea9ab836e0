//! File export, import and demo fixtures.
//!
//! Import is two-pass: a lenient envelope keeps nested entities as raw JSON,
//! the migration upgrades them, and only then does strict validation run.
//! Errors are folded into a few user-facing messages; the underlying cause is
//! kept as the error source for logs.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};

use super::persistence::document_value;
use crate::clock::to_iso;
use crate::constants::{APP_VERSION, EXPORT_FILE_PREFIX};
use crate::migration::{self, MigrationError};
use crate::models::AppState;
use crate::schema::{self, ImportEnvelope, SchemaViolation};

/// Fixture shipped with the crate: one project in the edit stage with tasks
/// and a stage-change history
pub const BUNDLED_DEMO: &str = include_str!("../../fixtures/demo-project.json");

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid JSON file, it may be corrupted.")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Invalid file format; expected a Publishing OS export.")]
    InvalidFormat(#[source] FormatProblem),

    #[error(
        "This file was created by a newer version of Publishing OS (schema v{found}); \
         this build supports up to schema v{supported}."
    )]
    UnsupportedVersion { found: u64, supported: u32 },

    #[error("Failed to load demo data.")]
    Fetch(#[source] FetchError),
}

/// What was wrong with a file that parsed as JSON
#[derive(Debug, thiserror::Error)]
pub enum FormatProblem {
    #[error(transparent)]
    Envelope(SchemaViolation),

    #[error(transparent)]
    Migration(MigrationError),

    #[error(transparent)]
    Schema(SchemaViolation),
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to read fixture: {0}")]
    Io(#[from] io::Error),
}

impl From<MigrationError> for ImportError {
    fn from(e: MigrationError) -> Self {
        match e {
            MigrationError::UnsupportedVersion { found, supported } => {
                ImportError::UnsupportedVersion { found, supported }
            }
            other => ImportError::InvalidFormat(FormatProblem::Migration(other)),
        }
    }
}

/// Serialized export file, ready to be written or offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub contents: String,
}

impl ExportArtifact {
    /// Write into `dir` under the artifact's file name
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("{}-{}.json", EXPORT_FILE_PREFIX, at.format("%Y-%m-%d"))
}

/// Document plus `exportedAt` and `appVersion`, pretty-printed
pub fn export_json(state: &AppState, at: DateTime<Utc>) -> Result<ExportArtifact, serde_json::Error> {
    let mut value = document_value(state)?;
    if let Value::Object(map) = &mut value {
        map.insert("exportedAt".to_string(), Value::from(to_iso(at)));
        map.insert("appVersion".to_string(), Value::from(APP_VERSION));
    }
    Ok(ExportArtifact {
        file_name: export_file_name(at),
        contents: serde_json::to_string_pretty(&value)?,
    })
}

pub fn import_from_text(text: &str) -> Result<AppState, ImportError> {
    let raw: Value = serde_json::from_str(text).map_err(ImportError::InvalidJson)?;
    let envelope = ImportEnvelope::parse(raw)
        .map_err(|e| ImportError::InvalidFormat(FormatProblem::Envelope(e)))?;
    let migrated = migration::migrate(envelope.into_document())?;
    let state = schema::validate_app_state(migrated)
        .map_err(|e| ImportError::InvalidFormat(FormatProblem::Schema(e)))?;
    tracing::info!(
        projects = state.projects.len(),
        tasks = state.tasks.len(),
        activities = state.activities.len(),
        "import validated"
    );
    Ok(state)
}

/// Fetch a fixture from an `http(s)://` URL or read it from a local path, then
/// import it like any other file
pub async fn load_demo_fixture(source: &str) -> Result<AppState, ImportError> {
    let text = fetch_fixture_text(source).await.map_err(ImportError::Fetch)?;
    import_from_text(&text)
}

async fn fetch_fixture_text(source: &str) -> Result<String, FetchError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let response = reqwest::get(source).await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        return Ok(response.text().await?);
    }
    let path = source.strip_prefix("file://").unwrap_or(source);
    Ok(tokio::fs::read_to_string(path).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CURRENT_SCHEMA_VERSION;
    use crate::models::{ActivityKind, Stage, TaskStatus};
    use crate::seed::initial_state;
    use chrono::TimeZone;
    use serde_json::json;
    use std::error::Error;
    use tempfile::tempdir;

    #[test]
    fn test_export_envelope() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let artifact = export_json(&AppState::default(), at).unwrap();

        assert_eq!(artifact.file_name, "publishing-os-export-2024-05-01.json");
        let value: Value = serde_json::from_str(&artifact.contents).unwrap();
        assert_eq!(value["exportedAt"], "2024-05-01T09:00:00.000Z");
        assert_eq!(value["appVersion"], APP_VERSION);
        assert_eq!(value["version"], CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let state = initial_state(Utc::now());
        let artifact = export_json(&state, Utc::now()).unwrap();
        let imported = import_from_text(&artifact.contents).unwrap();
        assert_eq!(imported, state);
    }

    #[test]
    fn test_import_invalid_json() {
        let err = import_from_text("{ not json").unwrap_err();
        assert!(matches!(err, ImportError::InvalidJson(_)));
        assert_eq!(err.to_string(), "Invalid JSON file, it may be corrupted.");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_import_unrecognized_shape() {
        for text in [
            "[]",
            "42",
            r#"{"projects": "all of them"}"#,
            r#"{"projects": [{"id": "p1"}]}"#,
            r#"{"version": 1, "projects": [{"id": "p1", "stage": "printing"}]}"#,
        ] {
            let err = import_from_text(text).unwrap_err();
            assert!(matches!(err, ImportError::InvalidFormat(_)), "{text}");
            assert_eq!(
                err.to_string(),
                "Invalid file format; expected a Publishing OS export."
            );
        }
    }

    #[test]
    fn test_import_future_version() {
        let err = import_from_text(r#"{"version": 999, "projects": []}"#).unwrap_err();
        assert!(matches!(
            err,
            ImportError::UnsupportedVersion {
                found: 999,
                supported: CURRENT_SCHEMA_VERSION
            }
        ));
    }

    #[test]
    fn test_import_legacy_file() {
        let text = json!({
            "projects": [{
                "id": "p1",
                "status": "ready",
                "metadata": {
                    "title": "Old Export",
                    "author": "A",
                    "keywords": [],
                    "categories": [],
                    "blurb": ""
                },
                "checklist": [],
                "assets": [],
                "notes": "",
                "createdAt": "2023-01-01T00:00:00.000Z",
                "updatedAt": "2023-01-01T00:00:00.000Z"
            }],
            "activities": [],
            "exportedAt": "2023-02-01T00:00:00.000Z"
        })
        .to_string();

        let state = import_from_text(&text).unwrap();
        assert_eq!(state.version, CURRENT_SCHEMA_VERSION);
        assert_eq!(state.projects[0].stage, Stage::Format);
        assert!(state.tasks.is_empty());
    }

    #[test]
    fn test_bundled_demo_imports() {
        let state = import_from_text(BUNDLED_DEMO).unwrap();
        assert_eq!(state.projects.len(), 1);
        assert_eq!(state.projects[0].stage, Stage::Edit);
        assert_eq!(state.tasks.len(), 4);
        assert!(state.tasks.iter().any(|t| t.status == TaskStatus::Done));
        assert!(state.tasks.iter().any(|t| t.status == TaskStatus::Doing));
        assert!(state.tasks.iter().any(|t| t.status == TaskStatus::Todo));
        assert!(state
            .activities
            .iter()
            .any(|a| a.kind == ActivityKind::StageChanged));
    }

    #[tokio::test]
    async fn test_demo_fixture_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("demo.json");
        std::fs::write(&path, BUNDLED_DEMO).unwrap();

        let state = load_demo_fixture(path.to_str().unwrap()).await.unwrap();
        assert_eq!(state.projects.len(), 1);

        let url = format!("file://{}", path.display());
        assert!(load_demo_fixture(&url).await.is_ok());
    }

    #[tokio::test]
    async fn test_demo_fixture_missing_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = load_demo_fixture(missing.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, ImportError::Fetch(FetchError::Io(_))));
        assert_eq!(err.to_string(), "Failed to load demo data.");
    }

    #[test]
    fn test_artifact_write_to() {
        let dir = tempdir().unwrap();
        let artifact = ExportArtifact {
            file_name: "out.json".to_string(),
            contents: "{}".to_string(),
        };
        let path = artifact.write_to(&dir.path().join("exports")).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
    }
}
