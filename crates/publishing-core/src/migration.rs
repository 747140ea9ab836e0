//! Version-indexed upgrades of raw documents.
//!
//! This is the only place that rewrites untyped JSON. A document goes in with
//! whatever shape an older build (or a hand-edited export) left behind, and
//! comes out in the current shape, ready for the strict pass in
//! [`crate::schema`].
//!
//! # Versions
//! - `0` (no `version` key): projects carry a legacy `status` instead of a
//!   `stage`, and `tasks` may be missing.
//! - `1`: current.
//!
//! Migration is one-way. Documents from a newer build are refused rather than
//! read as if they were current.

use serde_json::{Map, Value};

use crate::constants::CURRENT_SCHEMA_VERSION;
use crate::models::{LegacyStatus, Stage};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    #[error("document is not a JSON object")]
    NotAnObject,

    #[error("invalid schema version {0}")]
    InvalidVersion(String),

    #[error("schema version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u64, supported: u32 },
}

/// How a raw project record describes its workflow position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectShape {
    /// Carries a `stage` key; left as is (the strict pass checks the value)
    Current,
    /// Only the legacy `status`, or nothing; unrecognized values read as `None`
    Legacy { status: Option<LegacyStatus> },
}

impl ProjectShape {
    pub fn classify(project: &Map<String, Value>) -> Self {
        if project.contains_key("stage") {
            return ProjectShape::Current;
        }
        let status = project
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<LegacyStatus>().ok());
        ProjectShape::Legacy { status }
    }

    /// Stage to write for a legacy record; `None` for current records
    pub fn derived_stage(self) -> Option<Stage> {
        match self {
            ProjectShape::Current => None,
            ProjectShape::Legacy { status } => {
                Some(status.map(LegacyStatus::stage).unwrap_or(Stage::Draft))
            }
        }
    }
}

type Step = fn(&mut Map<String, Value>);

/// `STEPS[n]` upgrades a version-`n` document to version `n + 1`
const STEPS: [Step; CURRENT_SCHEMA_VERSION as usize] = [stage_from_legacy_status];

/// Upgrade `raw` to the current schema version.
///
/// Migrating an already-current document only fills in missing `tasks` and
/// `activities`, so `migrate(migrate(x)) == migrate(x)`.
pub fn migrate(raw: Value) -> Result<Value, MigrationError> {
    let Value::Object(mut doc) = raw else {
        return Err(MigrationError::NotAnObject);
    };

    let source = source_version(&doc)?;
    if source > u64::from(CURRENT_SCHEMA_VERSION) {
        return Err(MigrationError::UnsupportedVersion {
            found: source,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    for step in &STEPS[source as usize..] {
        step(&mut doc);
    }

    ensure_array(&mut doc, "tasks");
    ensure_array(&mut doc, "activities");
    doc.insert("version".to_string(), Value::from(CURRENT_SCHEMA_VERSION));

    Ok(Value::Object(doc))
}

/// Version recorded in the document; absent or null means version 0
pub fn source_version(doc: &Map<String, Value>) -> Result<u64, MigrationError> {
    match doc.get("version") {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| MigrationError::InvalidVersion(n.to_string())),
        Some(other) => Err(MigrationError::InvalidVersion(other.to_string())),
    }
}

fn ensure_array(doc: &mut Map<String, Value>, key: &str) {
    match doc.get(key) {
        None | Some(Value::Null) => {
            doc.insert(key.to_string(), Value::Array(Vec::new()));
        }
        // Wrong types are left for the strict pass to reject
        Some(_) => {}
    }
}

/// 0 → 1: derive `stage` from legacy `status` and drop `status` everywhere
fn stage_from_legacy_status(doc: &mut Map<String, Value>) {
    if let Some(Value::Array(projects)) = doc.get_mut("projects") {
        for project in projects.iter_mut() {
            let Value::Object(record) = project else {
                continue;
            };
            if let Some(stage) = ProjectShape::classify(record).derived_stage() {
                record.insert("stage".to_string(), Value::from(stage.key()));
            }
            record.remove("status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy_project(status: Option<&str>) -> Value {
        let mut project = json!({
            "id": "p1",
            "metadata": { "title": "Old Book", "author": "Someone" },
            "checklist": [],
            "assets": [],
            "notes": "",
            "createdAt": "2023-01-01T00:00:00.000Z",
            "updatedAt": "2023-01-01T00:00:00.000Z"
        });
        if let Some(status) = status {
            project["status"] = json!(status);
        }
        project
    }

    fn migrated_stage(status: Option<&str>) -> Value {
        let doc = json!({ "projects": [legacy_project(status)], "activities": [] });
        migrate(doc).unwrap()["projects"][0]["stage"].clone()
    }

    #[test]
    fn test_legacy_status_mapping_is_total() {
        assert_eq!(migrated_stage(Some("drafting")), "draft");
        assert_eq!(migrated_stage(Some("ready")), "format");
        assert_eq!(migrated_stage(Some("published")), "publish");
        assert_eq!(migrated_stage(Some("archived")), "draft");
        assert_eq!(migrated_stage(None), "draft");
    }

    #[test]
    fn test_legacy_document_upgrade() {
        let doc = json!({ "projects": [legacy_project(Some("published"))] });
        let migrated = migrate(doc).unwrap();

        assert_eq!(migrated["version"], CURRENT_SCHEMA_VERSION);
        assert_eq!(migrated["projects"][0]["stage"], "publish");
        assert!(migrated["projects"][0].get("status").is_none());
        assert_eq!(migrated["tasks"], json!([]));
        assert_eq!(migrated["activities"], json!([]));
    }

    #[test]
    fn test_existing_stage_is_kept_and_status_dropped() {
        let mut project = legacy_project(Some("published"));
        project["stage"] = json!("cover");
        let migrated = migrate(json!({ "projects": [project] })).unwrap();

        assert_eq!(migrated["projects"][0]["stage"], "cover");
        assert!(migrated["projects"][0].get("status").is_none());
    }

    #[test]
    fn test_current_document_unchanged() {
        let doc = json!({
            "version": CURRENT_SCHEMA_VERSION,
            "projects": [{ "id": "p1", "stage": "edit", "status": "ready" }],
            "tasks": [{ "id": "t1" }],
            "activities": []
        });
        assert_eq!(migrate(doc.clone()).unwrap(), doc);
    }

    #[test]
    fn test_current_document_gets_missing_arrays() {
        let migrated = migrate(json!({ "version": 1, "projects": [] })).unwrap();
        assert_eq!(migrated["tasks"], json!([]));
        assert_eq!(migrated["activities"], json!([]));
    }

    #[test]
    fn test_migration_is_idempotent() {
        let inputs = [
            json!({ "projects": [legacy_project(Some("ready")), legacy_project(None)] }),
            json!({ "version": 0, "projects": [], "tasks": null }),
            json!({ "version": 1, "projects": [{ "id": "x", "stage": "draft" }] }),
            json!({}),
        ];
        for input in inputs {
            let once = migrate(input).unwrap();
            let twice = migrate(once.clone()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_future_version_rejected() {
        let err = migrate(json!({ "version": 999, "projects": [] })).unwrap_err();
        assert_eq!(
            err,
            MigrationError::UnsupportedVersion {
                found: 999,
                supported: CURRENT_SCHEMA_VERSION
            }
        );
    }

    #[test]
    fn test_malformed_documents() {
        assert_eq!(migrate(json!([1, 2])).unwrap_err(), MigrationError::NotAnObject);
        assert!(matches!(
            migrate(json!({ "version": "1" })).unwrap_err(),
            MigrationError::InvalidVersion(_)
        ));
        assert!(matches!(
            migrate(json!({ "version": -2 })).unwrap_err(),
            MigrationError::InvalidVersion(_)
        ));
        assert!(matches!(
            migrate(json!({ "version": 1.5 })).unwrap_err(),
            MigrationError::InvalidVersion(_)
        ));
    }

    #[test]
    fn test_classify_shapes() {
        let current = json!({ "stage": "edit", "status": "ready" });
        assert_eq!(
            ProjectShape::classify(current.as_object().unwrap()),
            ProjectShape::Current
        );

        let legacy = json!({ "status": "ready" });
        let shape = ProjectShape::classify(legacy.as_object().unwrap());
        assert_eq!(
            shape,
            ProjectShape::Legacy {
                status: Some(LegacyStatus::Ready)
            }
        );
        assert_eq!(shape.derived_stage(), Some(Stage::Format));
    }
}
