use serde::{Deserialize, Serialize};

use super::{Activity, Project, Task};
use crate::constants::CURRENT_SCHEMA_VERSION;

fn current_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

/// The whole persisted document.
///
/// Activities are kept most-recent-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            projects: Vec::new(),
            tasks: Vec::new(),
            activities: Vec::new(),
        }
    }
}

impl AppState {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks_for_project<'a>(&'a self, project_id: &'a str) -> impl Iterator<Item = &'a Task> {
        self.tasks.iter().filter(move |t| t.project_id == project_id)
    }

    pub fn activities_for_project<'a>(
        &'a self,
        project_id: &'a str,
    ) -> impl Iterator<Item = &'a Activity> {
        self.activities.iter().filter(move |a| a.project_id == project_id)
    }

    pub(crate) fn project_index(&self, id: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.id == id)
    }

    pub(crate) fn task_index(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_defaults() {
        let state: AppState = serde_json::from_value(json!({})).unwrap();
        assert_eq!(state.version, CURRENT_SCHEMA_VERSION);
        assert!(state.projects.is_empty());
        assert!(state.tasks.is_empty());
        assert!(state.activities.is_empty());
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn test_negative_version_rejected() {
        assert!(serde_json::from_value::<AppState>(json!({ "version": -1 })).is_err());
    }
}
