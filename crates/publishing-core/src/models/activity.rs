use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Created,
    StatusChanged,
    StageChanged,
    MetadataUpdated,
    ChecklistUpdated,
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    AssetUploaded,
}

impl ActivityKind {
    pub fn key(self) -> &'static str {
        match self {
            ActivityKind::Created => "created",
            ActivityKind::StatusChanged => "status_changed",
            ActivityKind::StageChanged => "stage_changed",
            ActivityKind::MetadataUpdated => "metadata_updated",
            ActivityKind::ChecklistUpdated => "checklist_updated",
            ActivityKind::TaskCreated => "task_created",
            ActivityKind::TaskUpdated => "task_updated",
            ActivityKind::TaskDeleted => "task_deleted",
            ActivityKind::AssetUploaded => "asset_uploaded",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Audit record written by the store in response to a mutation. Never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub project_id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    pub timestamp: String,
}
