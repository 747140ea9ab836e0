//! Strict validation for every persisted entity, plus the lenient envelope
//! used as the first pass of an import.
//!
//! Strict validation is "deserialize into the typed model, then check the
//! rules serde cannot express" (non-blank required strings, unique ids).
//! Unknown enum values fail deserialization; they are never coerced.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

use crate::models::{Activity, AppState, Asset, ChecklistItem, Metadata, Project, Task};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    /// Wrong type, missing key, or a value outside a closed enum
    #[error("invalid {entity}: {message}")]
    Malformed {
        entity: &'static str,
        message: String,
    },

    /// Required string that is empty after trimming
    #[error("{0} is required")]
    Required(&'static str),

    #[error("duplicate project id \"{0}\"")]
    DuplicateProjectId(String),
}

/// Rules checked after an entity deserialized successfully
pub trait Validate {
    /// Name used in error messages
    const ENTITY: &'static str;

    fn check(&self) -> Result<(), SchemaViolation> {
        Ok(())
    }
}

/// Deserialize `raw` into `T` and run its checks
pub fn validate<T>(raw: Value) -> Result<T, SchemaViolation>
where
    T: DeserializeOwned + Validate,
{
    let entity: T = serde_json::from_value(raw).map_err(|e| SchemaViolation::Malformed {
        entity: T::ENTITY,
        message: e.to_string(),
    })?;
    entity.check()?;
    Ok(entity)
}

pub(crate) fn require(value: &str, field: &'static str) -> Result<(), SchemaViolation> {
    if value.trim().is_empty() {
        Err(SchemaViolation::Required(field))
    } else {
        Ok(())
    }
}

impl Validate for Metadata {
    const ENTITY: &'static str = "metadata";

    fn check(&self) -> Result<(), SchemaViolation> {
        require(&self.title, "Title")?;
        require(&self.author, "Author")
    }
}

impl Validate for Project {
    const ENTITY: &'static str = "project";

    fn check(&self) -> Result<(), SchemaViolation> {
        self.metadata.check()
    }
}

impl Validate for Task {
    const ENTITY: &'static str = "task";

    fn check(&self) -> Result<(), SchemaViolation> {
        require(&self.title, "Task title")
    }
}

impl Validate for ChecklistItem {
    const ENTITY: &'static str = "checklist item";
}

impl Validate for Asset {
    const ENTITY: &'static str = "asset";
}

impl Validate for Activity {
    const ENTITY: &'static str = "activity";
}

impl Validate for AppState {
    const ENTITY: &'static str = "document";

    fn check(&self) -> Result<(), SchemaViolation> {
        let mut seen = HashSet::with_capacity(self.projects.len());
        for project in &self.projects {
            project.check()?;
            if !seen.insert(project.id.as_str()) {
                return Err(SchemaViolation::DuplicateProjectId(project.id.clone()));
            }
        }
        for task in &self.tasks {
            task.check()?;
        }
        Ok(())
    }
}

pub fn validate_metadata(raw: Value) -> Result<Metadata, SchemaViolation> {
    validate(raw)
}

pub fn validate_project(raw: Value) -> Result<Project, SchemaViolation> {
    validate(raw)
}

pub fn validate_task(raw: Value) -> Result<Task, SchemaViolation> {
    validate(raw)
}

pub fn validate_checklist_item(raw: Value) -> Result<ChecklistItem, SchemaViolation> {
    validate(raw)
}

pub fn validate_asset(raw: Value) -> Result<Asset, SchemaViolation> {
    validate(raw)
}

pub fn validate_activity(raw: Value) -> Result<Activity, SchemaViolation> {
    validate(raw)
}

pub fn validate_app_state(raw: Value) -> Result<AppState, SchemaViolation> {
    validate(raw)
}

/// Loosely typed first pass over an import file.
///
/// Nested entities are kept as raw JSON so that old shapes survive until the
/// migration has upgraded them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEnvelope {
    #[serde(default)]
    pub version: Option<Number>,
    #[serde(default)]
    pub projects: Vec<Value>,
    #[serde(default)]
    pub tasks: Option<Vec<Value>>,
    #[serde(default)]
    pub activities: Option<Vec<Value>>,
    #[serde(default)]
    pub exported_at: Option<String>,
    #[serde(default)]
    pub app_version: Option<String>,
}

impl ImportEnvelope {
    /// Parse an import document. Anything but a JSON object is rejected up front.
    pub fn parse(raw: Value) -> Result<Self, SchemaViolation> {
        if !raw.is_object() {
            return Err(SchemaViolation::Malformed {
                entity: "import file",
                message: "expected a JSON object".to_string(),
            });
        }
        serde_json::from_value(raw).map_err(|e| SchemaViolation::Malformed {
            entity: "import file",
            message: e.to_string(),
        })
    }

    /// Rebuild the document for migration, dropping the export-only fields
    pub fn into_document(self) -> Value {
        let mut doc = Map::new();
        if let Some(version) = self.version {
            doc.insert("version".to_string(), Value::Number(version));
        }
        doc.insert("projects".to_string(), Value::Array(self.projects));
        doc.insert(
            "tasks".to_string(),
            Value::Array(self.tasks.unwrap_or_default()),
        );
        doc.insert(
            "activities".to_string(),
            Value::Array(self.activities.unwrap_or_default()),
        );
        Value::Object(doc)
    }
}
