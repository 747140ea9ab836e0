use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use publishing_core::models::{AppState, Metadata, NewProject, NewTask, Project, ProjectPatch, Task};
use publishing_core::pack;
use publishing_core::store::views::{self, TaskFilter};
use publishing_core::store::{AppStore, ExportArtifact, StoreError};
use serde_json::{json, Value};

use super::command::CliCommand;
use super::config::CliConfig;

/// What a command prints
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Json(Value),
    /// Printed verbatim
    Text(String),
}

impl Output {
    pub fn render(&self, pretty: bool) -> Result<String> {
        match self {
            Output::Json(value) if pretty => {
                serde_json::to_string_pretty(value).context("Failed to serialize output")
            }
            Output::Json(value) => serde_json::to_string(value).context("Failed to serialize output"),
            Output::Text(text) => Ok(text.clone()),
        }
    }
}

fn find_project<'a>(state: &'a AppState, id: &str) -> Result<&'a Project, StoreError> {
    state
        .project(id)
        .ok_or_else(|| StoreError::ProjectNotFound(id.to_string()))
}

fn project_summary(state: &AppState, project: &Project) -> Value {
    json!({
        "id": project.id,
        "title": project.metadata.title,
        "byline": project.metadata.byline(),
        "stage": project.stage,
        "checklist": views::checklist_progress(project),
        "tasks": views::task_progress(state, &project.id),
        "updatedAt": project.updated_at,
    })
}

fn task_json(task: &Task, today: NaiveDate) -> Value {
    let mut value = json!(task);
    if let Value::Object(map) = &mut value {
        map.insert("overdue".to_string(), Value::Bool(views::is_overdue(task, today)));
    }
    value
}

fn write_artifact(artifact: &ExportArtifact, dir: &Path) -> Result<Value> {
    let path = artifact
        .write_to(dir)
        .with_context(|| format!("Failed to write {} into {}", artifact.file_name, dir.display()))?;
    Ok(json!({ "path": path.display().to_string() }))
}

fn document_counts(state: &AppState) -> Value {
    json!({
        "projects": state.projects.len(),
        "tasks": state.tasks.len(),
        "activities": state.activities.len(),
    })
}

/// Run one command against the store
pub fn execute(store: &mut AppStore, command: CliCommand, config: &CliConfig) -> Result<Output> {
    let today = Utc::now().date_naive();

    let value = match command {
        CliCommand::List { stage, search } => {
            let state = store.state();
            let projects: Vec<Value> = views::search_projects(state, search.as_deref().unwrap_or(""))
                .into_iter()
                .filter(|p| stage.map_or(true, |stage| p.stage == stage))
                .map(|p| project_summary(state, p))
                .collect();
            json!(projects)
        }

        CliCommand::Show { project_id } => {
            let state = store.state();
            let project = find_project(state, &project_id)?;
            let tasks: Vec<Value> = views::tasks_for_project(state, &project_id, TaskFilter::All, today)
                .into_iter()
                .map(|t| task_json(t, today))
                .collect();
            let activities: Vec<_> = state.activities_for_project(&project_id).collect();
            json!({
                "project": project,
                "checklistProgress": views::checklist_progress(project),
                "taskProgress": views::task_progress(state, &project_id),
                "tasks": tasks,
                "activities": activities,
            })
        }

        CliCommand::AddProject {
            title,
            author,
            stage,
            notes,
            metadata,
        } => {
            let metadata = metadata.apply_to(Metadata::new(title, author));
            let mut new = NewProject::from_metadata(metadata).with_stage(stage);
            new.notes = notes.unwrap_or_default();
            let id = store.add_project(new)?;
            json!({ "id": id })
        }

        CliCommand::UpdateProject {
            project_id,
            stage,
            status,
            title,
            author,
            notes,
            metadata,
        } => {
            let current = find_project(store.state(), &project_id)?.metadata.clone();
            let metadata_changed = title.is_some() || author.is_some() || !metadata.is_empty();
            let metadata = metadata_changed.then(|| {
                let mut updated = metadata.apply_to(current);
                if let Some(title) = title {
                    updated.title = title;
                }
                if let Some(author) = author {
                    updated.author = author;
                }
                updated
            });
            let patch = ProjectPatch {
                status,
                stage,
                metadata,
                notes,
                ..ProjectPatch::default()
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to update; pass at least one field");
            }
            store.update_project(&project_id, patch)?;
            project_summary(store.state(), find_project(store.state(), &project_id)?)
        }

        CliCommand::Advance { project_id } => {
            let stage = store.advance_stage(&project_id)?;
            json!({ "id": project_id, "advanced": stage.is_some(), "stage": find_project(store.state(), &project_id)?.stage })
        }

        CliCommand::DeleteProject { project_id } => {
            let project = store.delete_project(&project_id)?;
            json!({ "deleted": project.id, "title": project.metadata.title })
        }

        CliCommand::ToggleChecklist {
            project_id,
            item_id,
        } => {
            let completed = store.toggle_checklist_item(&project_id, &item_id)?;
            let project = find_project(store.state(), &project_id)?;
            json!({
                "itemId": item_id,
                "completed": completed,
                "checklistProgress": views::checklist_progress(project),
            })
        }

        CliCommand::AddAsset {
            project_id,
            kind,
            file_name,
        } => {
            let id = store.add_asset(&project_id, kind, &file_name)?;
            json!({ "id": id })
        }

        CliCommand::Tasks {
            project_id,
            filter,
            today: reference,
        } => {
            let today = reference.unwrap_or(today);
            let state = store.state();
            find_project(state, &project_id)?;
            let tasks: Vec<Value> = views::tasks_for_project(state, &project_id, filter, today)
                .into_iter()
                .map(|t| task_json(t, today))
                .collect();
            let counts: serde_json::Map<String, Value> = views::task_filter_counts(state, &project_id, today)
                .into_iter()
                .map(|(filter, count)| (filter.key().to_string(), Value::from(count)))
                .collect();
            json!({
                "projectId": project_id,
                "filter": filter.key(),
                "counts": counts,
                "tasks": tasks,
            })
        }

        CliCommand::AddTask {
            project_id,
            title,
            fields,
        } => {
            let patch = fields.into_patch(None);
            let mut new = NewTask::new(project_id, title);
            new.description = patch.description.flatten();
            new.due_date = patch.due_date.flatten();
            new.owner = patch.owner.flatten();
            new.tags = patch.tags.unwrap_or_default();
            new.status = patch.status.unwrap_or_default();
            let id = store.add_task(new)?;
            json!({ "id": id })
        }

        CliCommand::UpdateTask {
            task_id,
            title,
            fields,
        } => {
            let patch = fields.into_patch(title);
            if patch == Default::default() {
                anyhow::bail!("Nothing to update; pass at least one field");
            }
            store.update_task(&task_id, patch)?;
            json!(store.state().task(&task_id))
        }

        CliCommand::CycleTask { task_id } => {
            let status = store.cycle_task_status(&task_id)?;
            json!({ "id": task_id, "status": status })
        }

        CliCommand::DeleteTask { task_id } => {
            let task = store.delete_task(&task_id)?;
            json!({ "deleted": task.id, "title": task.title })
        }

        CliCommand::Activity { project, limit } => {
            let state = store.state();
            let activities: Vec<_> = match project.as_deref() {
                Some(project_id) => state.activities_for_project(project_id).take(limit).collect(),
                None => views::recent_activities(state, limit).iter().collect(),
            };
            json!(activities)
        }

        CliCommand::Dashboard => json!(views::dashboard(store.state())),

        CliCommand::Export { out } => {
            let artifact = store.export_json().context("Failed to serialize export")?;
            let dir = out.unwrap_or_else(|| config.export_dir());
            write_artifact(&artifact, &dir)?
        }

        CliCommand::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read import file: {}", file.display()))?;
            store.import_data(&text)?;
            document_counts(store.state())
        }

        CliCommand::Demo { source, bundled } => {
            match source.or_else(|| config.demo_url.clone()).filter(|_| !bundled) {
                Some(source) => {
                    let runtime = tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()
                        .context("Failed to start async runtime")?;
                    runtime.block_on(store.load_demo(&source))?;
                }
                None => store.load_bundled_demo()?,
            }
            document_counts(store.state())
        }

        CliCommand::Pack {
            project_id,
            json,
            out,
        } => {
            let project = find_project(store.state(), &project_id)?;
            let artifact = if json {
                pack::export_project_json(project).context("Failed to serialize project")?
            } else {
                pack::metadata_pack(project, Utc::now())
            };
            match out {
                Some(dir) => write_artifact(&artifact, &dir)?,
                None => return Ok(Output::Text(artifact.contents)),
            }
        }

        CliCommand::Reset => {
            store.reset_data();
            document_counts(store.state())
        }
    };

    Ok(Output::Json(value))
}
