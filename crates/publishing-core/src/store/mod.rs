pub mod app_store;
pub mod kv;
pub mod persistence;
pub mod transfer;
pub mod views;

pub use app_store::{AppStore, LoadSource, StoreError, SubscriptionId, ValidationError};
pub use kv::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use persistence::{hydrate, LoadError, Persistence, SaveOutcome};
pub use transfer::{
    export_json, import_from_text, load_demo_fixture, ExportArtifact, FetchError, FormatProblem,
    ImportError, BUNDLED_DEMO,
};
pub use views::{Dashboard, Progress, TaskFilter};
