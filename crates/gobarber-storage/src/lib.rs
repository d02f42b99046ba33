//! GoBarber Storage Layer
//!
//! Local persistence for client state. Values are plain strings keyed by
//! namespaced names (`@GoBarber:token`), the same contract a browser's
//! `localStorage` offers.

mod database;
mod error;
mod memory;
mod migrations;

pub use database::Database;
pub use error::StorageError;
pub use memory::MemoryStore;

pub type Result<T> = std::result::Result<T, StorageError>;

/// String-keyed slots that survive application restarts.
///
/// No atomicity is offered across keys; callers that write several keys
/// order the writes themselves.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}
