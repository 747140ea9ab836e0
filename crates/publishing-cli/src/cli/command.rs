use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use publishing_core::constants::RECENT_ACTIVITY_LIMIT;
use publishing_core::models::{
    parse_tags, AssetKind, LegacyStatus, Metadata, Stage, TaskPatch, TaskStatus,
};
use publishing_core::store::TaskFilter;

/// Optional metadata fields shared by `add-project` and `update-project`.
///
/// On update an empty string clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct MetadataArgs {
    #[arg(long)]
    pub subtitle: Option<String>,
    #[arg(long)]
    pub pen_name: Option<String>,
    #[arg(long)]
    pub series: Option<String>,
    #[arg(long)]
    pub isbn: Option<String>,
    /// Trim size, e.g. 6x9
    #[arg(long)]
    pub trim: Option<String>,
    /// Comma separated
    #[arg(long)]
    pub keywords: Option<String>,
    /// Comma separated
    #[arg(long)]
    pub categories: Option<String>,
    #[arg(long)]
    pub blurb: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl MetadataArgs {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay the given fields onto `metadata`
    pub fn apply_to(self, mut metadata: Metadata) -> Metadata {
        if let Some(subtitle) = self.subtitle {
            metadata.subtitle = non_empty(subtitle);
        }
        if let Some(pen_name) = self.pen_name {
            metadata.pen_name = non_empty(pen_name);
        }
        if let Some(series) = self.series {
            metadata.series = non_empty(series);
        }
        if let Some(isbn) = self.isbn {
            metadata.isbn = non_empty(isbn);
        }
        if let Some(trim) = self.trim {
            metadata.trim = non_empty(trim);
        }
        if let Some(keywords) = self.keywords {
            metadata.keywords = parse_tags(&keywords);
        }
        if let Some(categories) = self.categories {
            metadata.categories = parse_tags(&categories);
        }
        if let Some(blurb) = self.blurb {
            metadata.blurb = blurb;
        }
        metadata
    }
}

/// Optional task fields shared by `add-task` and `update-task`.
///
/// On update an empty string clears description, due date or owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct TaskArgs {
    #[arg(long)]
    pub description: Option<String>,
    /// Due date, YYYY-MM-DD
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub owner: Option<String>,
    /// Comma separated
    #[arg(long)]
    pub tags: Option<String>,
    #[arg(long)]
    pub status: Option<TaskStatus>,
}

impl TaskArgs {
    pub fn into_patch(self, title: Option<String>) -> TaskPatch {
        TaskPatch {
            title,
            description: self.description.map(non_empty),
            status: self.status,
            due_date: self.due.map(non_empty),
            owner: self.owner.map(non_empty),
            tags: self.tags.as_deref().map(parse_tags),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// List projects
    List {
        /// Only projects in this stage
        #[arg(long)]
        stage: Option<Stage>,
        /// Match title, author or pen name; '+' joins terms that must all match
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Show a project with its tasks and activity
    Show { project_id: String },

    /// Create a project
    AddProject {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long, default_value = "draft")]
        stage: Stage,
        #[arg(long)]
        notes: Option<String>,
        #[command(flatten)]
        metadata: MetadataArgs,
    },

    /// Change project fields
    UpdateProject {
        project_id: String,
        #[arg(long)]
        stage: Option<Stage>,
        /// Legacy status (drafting, ready, published), mapped to a stage
        #[arg(long, conflicts_with = "stage")]
        status: Option<LegacyStatus>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[command(flatten)]
        metadata: MetadataArgs,
    },

    /// Move a project to the next stage
    Advance { project_id: String },

    /// Delete a project with its tasks and activity
    DeleteProject { project_id: String },

    /// Flip a checklist item
    ToggleChecklist { project_id: String, item_id: String },

    /// Record an uploaded cover or interior file
    AddAsset {
        project_id: String,
        /// cover or interior
        #[arg(long, default_value = "cover")]
        kind: AssetKind,
        file_name: String,
    },

    /// List a project's tasks
    Tasks {
        project_id: String,
        /// all, todo, doing, done, overdue or week
        #[arg(long, short, default_value = "all")]
        filter: TaskFilter,
        /// Reference date for overdue and week filters (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Create a task
    AddTask {
        project_id: String,
        title: String,
        #[command(flatten)]
        fields: TaskArgs,
    },

    /// Change task fields
    UpdateTask {
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskArgs,
    },

    /// Move a task to its next status (todo, doing, done, todo)
    CycleTask { task_id: String },

    /// Delete a task
    DeleteTask { task_id: String },

    /// Recent activity, newest first
    Activity {
        #[arg(long)]
        project: Option<String>,
        #[arg(long, short = 'n', default_value_t = RECENT_ACTIVITY_LIMIT)]
        limit: usize,
    },

    /// Stage counts, recent activity and upcoming deadlines
    Dashboard,

    /// Write a full export file
    Export {
        /// Directory to write into (defaults to exportDir from config, then the current directory)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Replace all data with an export file
    Import { file: PathBuf },

    /// Replace all data with demo data
    Demo {
        /// URL or path of a fixture (defaults to demoUrl from config, then the bundled fixture)
        #[arg(long)]
        source: Option<String>,
        /// Ignore demoUrl and use the bundled fixture
        #[arg(long, conflicts_with = "source")]
        bundled: bool,
    },

    /// Print or write a project's metadata pack
    Pack {
        project_id: String,
        /// Single-project JSON instead of the text pack
        #[arg(long)]
        json: bool,
        /// Write the file into this directory instead of printing it
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Replace all data with the sample projects
    Reset,
}
