pub mod activity;
pub mod app_state;
pub mod project;
pub mod stage;
pub mod task;

pub use activity::{Activity, ActivityKind};
pub use app_state::AppState;
pub use project::{
    Asset, AssetKind, ChecklistItem, Metadata, NewProject, Platform, Project, ProjectPatch,
};
pub use stage::{LegacyStatus, Stage, UnknownVariant};
pub use task::{parse_tags, NewTask, Task, TaskPatch, TaskStatus};
