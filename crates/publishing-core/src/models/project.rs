use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::stage::{LegacyStatus, Stage, UnknownVariant};

/// Publishing metadata for one book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pen_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub blurb: String,
}

impl Metadata {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            author: author.into(),
            pen_name: None,
            series: None,
            isbn: None,
            trim: None,
            keywords: Vec::new(),
            categories: Vec::new(),
            blurb: String::new(),
        }
    }

    /// Name shown on listings: pen name if set, author otherwise
    pub fn byline(&self) -> &str {
        self.pen_name.as_deref().unwrap_or(&self.author)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Kdp,
    Ingramspark,
    Both,
}

/// Platform-specific publishing step (predates tasks)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    pub platform: Platform,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Cover,
    Interior,
}

impl AssetKind {
    pub fn key(self) -> &'static str {
        match self {
            AssetKind::Cover => "cover",
            AssetKind::Interior => "interior",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Cover => "Cover",
            AssetKind::Interior => "Interior",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for AssetKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cover" => Ok(AssetKind::Cover),
            "interior" => Ok(AssetKind::Interior),
            _ => Err(UnknownVariant::new("asset type", s)),
        }
    }
}

/// Asset metadata record. No file content is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
}

/// One publishing effort.
///
/// Unknown fields (including a leftover legacy `status`) are dropped on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub stage: Stage,
    pub metadata: Metadata,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Project {
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn completed_checklist_items(&self) -> usize {
        self.checklist.iter().filter(|item| item.completed).count()
    }

    /// Merge a patch into this project. Callers validate and stamp `updated_at`.
    pub(crate) fn apply(&mut self, patch: ProjectPatch) {
        if let Some(stage) = patch.resolved_stage() {
            self.stage = stage;
        }
        if let Some(metadata) = patch.metadata {
            self.metadata = metadata;
        }
        if let Some(checklist) = patch.checklist {
            self.checklist = checklist;
        }
        if let Some(assets) = patch.assets {
            self.assets = assets;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }
}

/// Fields for a project that does not exist yet (id and timestamps are assigned by the store)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub stage: Stage,
    pub metadata: Metadata,
    pub checklist: Vec<ChecklistItem>,
    pub assets: Vec<Asset>,
    pub notes: String,
}

impl NewProject {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self::from_metadata(Metadata::new(title, author))
    }

    pub fn from_metadata(metadata: Metadata) -> Self {
        Self {
            stage: Stage::Draft,
            metadata,
            checklist: Vec::new(),
            assets: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }
}

/// Partial update for a project.
///
/// `status` is accepted for callers still speaking the legacy vocabulary and is
/// translated to a stage; an explicit `stage` wins when both are given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub status: Option<LegacyStatus>,
    pub stage: Option<Stage>,
    pub metadata: Option<Metadata>,
    pub checklist: Option<Vec<ChecklistItem>>,
    pub assets: Option<Vec<Asset>>,
    pub notes: Option<String>,
}

impl ProjectPatch {
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::default()
        }
    }

    pub fn status(status: LegacyStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn metadata(metadata: Metadata) -> Self {
        Self {
            metadata: Some(metadata),
            ..Self::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }

    /// Stage the project ends up in once this patch is applied, if it changes at all
    pub fn resolved_stage(&self) -> Option<Stage> {
        self.stage.or_else(|| self.status.map(LegacyStatus::stage))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_project() -> Project {
        Project {
            id: "p1".to_string(),
            stage: Stage::Edit,
            metadata: Metadata::new("Book", "Author"),
            checklist: Vec::new(),
            assets: Vec::new(),
            notes: String::new(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_project_json_uses_camel_case() {
        let mut project = sample_project();
        project.metadata.pen_name = Some("P. Name".to_string());
        project.assets.push(Asset {
            id: "a1".to_string(),
            kind: AssetKind::Cover,
            file_name: "cover.jpg".to_string(),
            uploaded_at: None,
        });

        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["metadata"]["penName"], "P. Name");
        assert_eq!(value["assets"][0]["type"], "cover");
        assert_eq!(value["assets"][0]["fileName"], "cover.jpg");
        assert!(value["assets"][0].get("uploadedAt").is_none());
        assert_eq!(value["createdAt"], "2024-01-01T00:00:00.000Z");
        assert!(value.get("status").is_none());
    }

    #[test]
    fn test_project_defaults_missing_collections() {
        let project: Project = serde_json::from_value(json!({
            "id": "p1",
            "stage": "draft",
            "metadata": { "title": "T", "author": "A" },
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }))
        .unwrap();

        assert!(project.checklist.is_empty());
        assert!(project.assets.is_empty());
        assert_eq!(project.notes, "");
        assert_eq!(project.metadata.blurb, "");
        assert!(project.metadata.keywords.is_empty());
    }

    #[test]
    fn test_patch_stage_wins_over_status() {
        let patch = ProjectPatch {
            status: Some(LegacyStatus::Published),
            stage: Some(Stage::Cover),
            ..ProjectPatch::default()
        };
        assert_eq!(patch.resolved_stage(), Some(Stage::Cover));
        assert_eq!(
            ProjectPatch::status(LegacyStatus::Ready).resolved_stage(),
            Some(Stage::Format)
        );
    }

    #[test]
    fn test_apply_only_touches_present_fields() {
        let mut project = sample_project();
        project.notes = "keep".to_string();

        project.apply(ProjectPatch::stage(Stage::Cover));

        assert_eq!(project.stage, Stage::Cover);
        assert_eq!(project.notes, "keep");
        assert_eq!(project.metadata.title, "Book");
    }

    #[test]
    fn test_byline_prefers_pen_name() {
        let mut metadata = Metadata::new("T", "Real Name");
        assert_eq!(metadata.byline(), "Real Name");
        metadata.pen_name = Some("Pen".to_string());
        assert_eq!(metadata.byline(), "Pen");
    }
}
