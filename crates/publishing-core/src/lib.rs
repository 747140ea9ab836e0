pub mod clock;
pub mod config;
pub mod constants;
pub mod migration;
pub mod models;
pub mod pack;
pub mod schema;
pub mod search;
pub mod seed;
pub mod slug;
pub mod store;
pub mod tracing_setup;

// Re-export the store surface at crate root for convenience
pub use config::CoreConfig;
pub use models::AppState;
pub use store::{AppStore, Persistence, StoreError};
