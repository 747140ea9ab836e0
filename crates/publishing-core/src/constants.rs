//! Application-wide constants
//!
//! Centralized location for storage keys, schema versions and limits
//! that are used across multiple modules.

/// Schema version written into every persisted or exported document.
/// Increment when the document shape changes and add a migration step.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Well-known key the document is stored under
pub const STORAGE_KEY: &str = "publishing-os-data";

/// Key an unreadable persisted document is moved to before reseeding
pub const BACKUP_STORAGE_KEY: &str = "publishing-os-data.bak";

/// Version tag stamped into export files
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Export file names look like `publishing-os-export-2024-05-01.json`
pub const EXPORT_FILE_PREFIX: &str = "publishing-os-export";

/// Directory name used under the platform data dir
pub const DATA_DIR_NAME: &str = "publishing-os";

/// Activity log capacity; older entries are dropped on overflow
pub const MAX_ACTIVITIES: usize = 100;

// Dashboard defaults
pub const RECENT_ACTIVITY_LIMIT: usize = 10;
pub const UPCOMING_DEADLINE_LIMIT: usize = 5;
