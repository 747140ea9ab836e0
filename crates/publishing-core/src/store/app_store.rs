//! The live document and every mutation that can be applied to it.
//!
//! Each mutation validates its input before touching anything, applies the
//! change, records activities, saves, and finally notifies subscribers. A
//! failed save never rolls the in-memory document back.

use std::fmt;

use super::persistence::{hydrate, Persistence, SaveOutcome};
use super::transfer::{self, ExportArtifact, ImportError, BUNDLED_DEMO};
use crate::clock::{self, generate_id};
use crate::constants::MAX_ACTIVITIES;
use crate::models::{
    Activity, ActivityKind, AppState, Asset, AssetKind, ChecklistItem, NewProject, NewTask,
    LegacyStatus, Project, ProjectPatch, Stage, Task, TaskPatch, TaskStatus,
};
use crate::schema::{require, SchemaViolation, Validate};
use crate::seed;

/// Input rejected before any change was made
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    #[error("project \"{0}\" does not exist")]
    UnknownProject(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("checklist item not found: {0}")]
    ChecklistItemNotFound(String),

    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error(transparent)]
    Import(#[from] ImportError),
}

impl From<SchemaViolation> for StoreError {
    fn from(e: SchemaViolation) -> Self {
        StoreError::Validation(ValidationError::Schema(e))
    }
}

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&AppState) + Send>;

/// Where the document came from when the store was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Persisted,
    /// Nothing was stored
    Seed,
    /// Stored data could not be loaded; it was backed up and replaced
    Recovered,
}

pub struct AppStore {
    state: AppState,
    persistence: Persistence,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
    last_save: SaveOutcome,
    load_source: LoadSource,
}

impl fmt::Debug for AppStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppStore")
            .field("projects", &self.state.projects.len())
            .field("tasks", &self.state.tasks.len())
            .field("activities", &self.state.activities.len())
            .field("persistence", &self.persistence)
            .field("listeners", &self.listeners.len())
            .field("last_save", &self.last_save)
            .field("load_source", &self.load_source)
            .finish()
    }
}

impl AppStore {
    /// Load the persisted document, falling back to seed data.
    ///
    /// A stored document that is not JSON, or fails migration or validation,
    /// is backed up before the seed replaces it. The resulting document is saved right away.
    pub fn open(persistence: Persistence) -> Self {
        let (state, load_source) = match persistence.load() {
            None => {
                tracing::info!("no persisted document; starting from seed data");
                (seed::initial_state(clock::now()), LoadSource::Seed)
            }
            Some(raw) => match hydrate(raw.clone()) {
                Ok(state) => {
                    tracing::info!(
                        projects = state.projects.len(),
                        tasks = state.tasks.len(),
                        "loaded persisted document"
                    );
                    (state, LoadSource::Persisted)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "persisted document is unusable; starting from seed data");
                    persistence.backup(&raw);
                    (seed::initial_state(clock::now()), LoadSource::Recovered)
                }
            },
        };

        let mut store = Self::with_state(state, persistence);
        store.load_source = load_source;
        store.last_save = store.persistence.save(&store.state);
        store
    }

    /// Wrap an existing document without loading or saving
    pub fn with_state(state: AppState, persistence: Persistence) -> Self {
        Self {
            state,
            persistence,
            listeners: Vec::new(),
            next_subscription: 0,
            last_save: SaveOutcome::Skipped,
            load_source: LoadSource::Persisted,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    pub fn last_save(&self) -> SaveOutcome {
        self.last_save
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    /// Call `listener` with the new document after every committed change
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&AppState) + Send + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn commit(&mut self) {
        self.last_save = self.persistence.save(&self.state);
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state);
        }
    }

    /// Prepend an activity and enforce the retention cap. Does not commit.
    fn push_activity(
        &mut self,
        project_id: &str,
        kind: ActivityKind,
        description: String,
        timestamp: String,
    ) -> String {
        let id = generate_id();
        self.state.activities.insert(
            0,
            Activity {
                id: id.clone(),
                project_id: project_id.to_string(),
                kind,
                description,
                timestamp,
            },
        );
        self.state.activities.truncate(MAX_ACTIVITIES);
        id
    }

    fn project_index(&self, id: &str) -> Result<usize, StoreError> {
        self.state
            .project_index(id)
            .ok_or_else(|| StoreError::ProjectNotFound(id.to_string()))
    }

    fn task_index(&self, id: &str) -> Result<usize, StoreError> {
        self.state
            .task_index(id)
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))
    }

    // Projects

    pub fn add_project(&mut self, new: NewProject) -> Result<String, StoreError> {
        new.metadata.check()?;

        let now = clock::now_iso();
        let project = Project {
            id: generate_id(),
            stage: new.stage,
            metadata: new.metadata,
            checklist: new.checklist,
            assets: new.assets,
            notes: new.notes,
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        let id = project.id.clone();
        let description = format!("Project \"{}\" created", project.metadata.title);
        self.state.projects.push(project);
        self.push_activity(&id, ActivityKind::Created, description, now);

        tracing::debug!(project_id = %id, "project added");
        self.commit();
        Ok(id)
    }

    /// Merge `patch` into the project and log at most one change activity
    pub fn update_project(&mut self, id: &str, patch: ProjectPatch) -> Result<(), StoreError> {
        let index = self.project_index(id)?;
        if let Some(metadata) = &patch.metadata {
            metadata.check()?;
        }

        let now = clock::now_iso();
        let change = change_activity(&self.state.projects[index], &patch);
        let project = &mut self.state.projects[index];
        project.apply(patch);
        project.updated_at = now.clone();

        if let Some((kind, description)) = change {
            self.push_activity(id, kind, description, now);
        }
        self.commit();
        Ok(())
    }

    /// Move to the next workflow stage. `None` when already at the last stage.
    pub fn advance_stage(&mut self, id: &str) -> Result<Option<Stage>, StoreError> {
        let index = self.project_index(id)?;
        let Some(next) = self.state.projects[index].stage.next() else {
            return Ok(None);
        };
        self.update_project(id, ProjectPatch::stage(next))?;
        Ok(Some(next))
    }

    /// Remove a project together with its tasks and activities
    pub fn delete_project(&mut self, id: &str) -> Result<Project, StoreError> {
        let index = self.project_index(id)?;
        let project = self.state.projects.remove(index);
        self.state.tasks.retain(|t| t.project_id != id);
        self.state.activities.retain(|a| a.project_id != id);

        tracing::debug!(project_id = %id, "project deleted");
        self.commit();
        Ok(project)
    }

    /// Replace the checklist wholesale
    pub fn update_checklist(
        &mut self,
        project_id: &str,
        checklist: Vec<ChecklistItem>,
    ) -> Result<(), StoreError> {
        let index = self.project_index(project_id)?;
        let now = clock::now_iso();
        let project = &mut self.state.projects[index];
        project.checklist = checklist;
        project.updated_at = now.clone();

        self.push_activity(
            project_id,
            ActivityKind::ChecklistUpdated,
            "Checklist updated".to_string(),
            now,
        );
        self.commit();
        Ok(())
    }

    /// Flip one checklist item; returns its new completion state
    pub fn toggle_checklist_item(
        &mut self,
        project_id: &str,
        item_id: &str,
    ) -> Result<bool, StoreError> {
        let index = self.project_index(project_id)?;
        let mut checklist = self.state.projects[index].checklist.clone();
        let item = checklist
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| StoreError::ChecklistItemNotFound(item_id.to_string()))?;
        item.completed = !item.completed;
        let completed = item.completed;

        self.update_checklist(project_id, checklist)?;
        Ok(completed)
    }

    /// Record an uploaded file. Only metadata is kept.
    pub fn add_asset(
        &mut self,
        project_id: &str,
        kind: AssetKind,
        file_name: &str,
    ) -> Result<String, StoreError> {
        let index = self.project_index(project_id)?;
        require(file_name, "File name")?;

        let now = clock::now_iso();
        let asset = Asset {
            id: generate_id(),
            kind,
            file_name: file_name.trim().to_string(),
            uploaded_at: Some(now.clone()),
        };
        let id = asset.id.clone();
        let description = format!("{} uploaded: {}", kind.label(), asset.file_name);
        let project = &mut self.state.projects[index];
        project.assets.push(asset);
        project.updated_at = now.clone();

        self.push_activity(project_id, ActivityKind::AssetUploaded, description, now);
        self.commit();
        Ok(id)
    }

    pub fn remove_asset(&mut self, project_id: &str, asset_id: &str) -> Result<Asset, StoreError> {
        let index = self.project_index(project_id)?;
        let project = &mut self.state.projects[index];
        let position = project
            .assets
            .iter()
            .position(|a| a.id == asset_id)
            .ok_or_else(|| StoreError::AssetNotFound(asset_id.to_string()))?;
        let asset = project.assets.remove(position);
        project.updated_at = clock::now_iso();

        self.commit();
        Ok(asset)
    }

    /// Log an arbitrary activity; returns its id
    pub fn add_activity(
        &mut self,
        project_id: &str,
        kind: ActivityKind,
        description: impl Into<String>,
    ) -> String {
        let id = self.push_activity(project_id, kind, description.into(), clock::now_iso());
        self.commit();
        id
    }

    // Tasks

    pub fn add_task(&mut self, new: NewTask) -> Result<String, StoreError> {
        require(&new.title, "Task title")?;
        if self.state.project(&new.project_id).is_none() {
            return Err(ValidationError::UnknownProject(new.project_id).into());
        }

        let now = clock::now_iso();
        let task = Task {
            id: generate_id(),
            project_id: new.project_id,
            title: new.title.trim().to_string(),
            description: new.description,
            status: new.status,
            due_date: new.due_date,
            owner: new.owner,
            tags: new.tags,
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        let id = task.id.clone();
        let project_id = task.project_id.clone();
        let description = format!("Task \"{}\" created", task.title);
        self.state.tasks.push(task);

        self.push_activity(&project_id, ActivityKind::TaskCreated, description, now);
        self.commit();
        Ok(id)
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<(), StoreError> {
        let index = self.task_index(id)?;
        if let Some(title) = &patch.title {
            require(title, "Task title")?;
        }

        let now = clock::now_iso();
        let task = &mut self.state.tasks[index];
        let status_only = patch.status.filter(|status| {
            *status != task.status
                && patch.title.is_none()
                && patch.description.is_none()
                && patch.due_date.is_none()
                && patch.owner.is_none()
                && patch.tags.is_none()
        });
        let mut patch = patch;
        if let Some(title) = patch.title.as_mut() {
            *title = title.trim().to_string();
        }
        task.apply(patch);
        task.updated_at = now.clone();

        let description = match status_only {
            Some(status) => format!("Task \"{}\" marked as {}", task.title, status),
            None => format!("Task \"{}\" updated", task.title),
        };
        let project_id = task.project_id.clone();

        self.push_activity(&project_id, ActivityKind::TaskUpdated, description, now);
        self.commit();
        Ok(())
    }

    /// todo → doing → done → todo; returns the new status
    pub fn cycle_task_status(&mut self, id: &str) -> Result<TaskStatus, StoreError> {
        let index = self.task_index(id)?;
        let next = self.state.tasks[index].status.next();
        self.update_task(id, TaskPatch::status(next))?;
        Ok(next)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task, StoreError> {
        let index = self.task_index(id)?;
        let task = self.state.tasks.remove(index);

        self.push_activity(
            &task.project_id,
            ActivityKind::TaskDeleted,
            format!("Task \"{}\" deleted", task.title),
            clock::now_iso(),
        );
        self.commit();
        Ok(task)
    }

    // Whole-document operations. None of these log activities.

    /// Replace everything with fresh seed data
    pub fn reset_data(&mut self) {
        self.state = seed::initial_state(clock::now());
        tracing::info!("document reset to seed data");
        self.commit();
    }

    pub fn export_json(&self) -> Result<ExportArtifact, serde_json::Error> {
        self.persistence.export_json(&self.state)
    }

    /// Replace the document with an import file. On error nothing changes.
    pub fn import_data(&mut self, text: &str) -> Result<(), StoreError> {
        let state = transfer::import_from_text(text)?;
        self.replace(state);
        Ok(())
    }

    /// Replace the document with a fixture fetched from a URL or read from a path
    pub async fn load_demo(&mut self, source: &str) -> Result<(), StoreError> {
        let state = transfer::load_demo_fixture(source).await?;
        self.replace(state);
        Ok(())
    }

    /// Replace the document with the fixture compiled into the crate
    pub fn load_bundled_demo(&mut self) -> Result<(), StoreError> {
        self.import_data(BUNDLED_DEMO)
    }

    fn replace(&mut self, state: AppState) {
        tracing::info!(
            projects = state.projects.len(),
            tasks = state.tasks.len(),
            "document replaced"
        );
        self.state = state;
        self.commit();
    }
}

/// The single change activity an update earns, by precedence:
/// legacy status change, then metadata edit. A bare stage move
/// (no status, no metadata) logs `stage_changed`.
fn change_activity(project: &Project, patch: &ProjectPatch) -> Option<(ActivityKind, String)> {
    if let Some(status) = patch.status {
        let current = LegacyStatus::for_stage(project.stage);
        if status != current {
            return Some((
                ActivityKind::StatusChanged,
                format!("Status changed from \"{}\" to \"{}\"", current, status),
            ));
        }
    }
    if patch.metadata.is_some() {
        return Some((ActivityKind::MetadataUpdated, "Metadata updated".to_string()));
    }
    match patch.stage {
        Some(stage) if patch.status.is_none() && stage != project.stage => Some((
            ActivityKind::StageChanged,
            format!(
                "Stage changed from \"{}\" to \"{}\"",
                project.stage.label(),
                stage.label()
            ),
        )),
        _ => None,
    }
}
