//! Crash-safe persistence for Monitor AR
//!
//! Every record is a JSON file replaced atomically (temp file + rename).
//!
//! - [`json`] - atomic JSON read/write and the typed [`JsonFile`] slot
//! - [`snapshot_store`] - current and last-known-good market snapshots

pub mod error;
pub mod json;
pub mod snapshot_store;

pub use error::StorageError;
pub use json::{read_json, write_json_atomic, JsonFile};
pub use snapshot_store::SnapshotStore;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
