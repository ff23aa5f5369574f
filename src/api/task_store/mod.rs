//! Task storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database file
//!
//! Dates are stored as `YYYYMMDD` strings, so ordering by the `date` column
//! is chronological. Every backend must keep that property.

mod memory;
mod sqlite;

pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::task::{NewTask, Task, TaskId};

/// Storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// A stored record violates the write-time invariants.
    #[error("task {id} is corrupt: {reason}")]
    Corrupt { id: TaskId, reason: String },

    #[error("storage error: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Backend(format!("Task join error: {}", err))
    }
}

/// Task store trait - implemented by all storage backends.
///
/// Reads for an id observe every completed write for that id.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// List tasks ordered by date, optionally filtered by a case-insensitive
    /// substring of title or comment.
    async fn list_tasks(&self, search: Option<&str>, limit: usize) -> Result<Vec<Task>, StoreError>;

    /// Get a single task by ID.
    async fn get_task(&self, id: TaskId) -> Result<Task, StoreError>;

    /// Insert a task and return its new ID.
    async fn insert_task(&self, task: &NewTask) -> Result<TaskId, StoreError>;

    /// Replace every field of an existing task.
    async fn update_task(&self, task: &Task) -> Result<(), StoreError>;

    /// Move an existing task to a new date.
    async fn update_date(&self, id: TaskId, date: &str) -> Result<(), StoreError>;

    /// Delete a task.
    async fn delete_task(&self, id: TaskId) -> Result<(), StoreError>;
}

/// Task store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStoreType {
    Memory,
    #[default]
    Sqlite,
}

impl TaskStoreType {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }
}

/// Create a task store based on type and configuration.
pub async fn create_task_store(
    store_type: TaskStoreType,
    db_path: PathBuf,
) -> Result<Box<dyn TaskStore>, StoreError> {
    match store_type {
        TaskStoreType::Memory => Ok(Box::new(InMemoryTaskStore::new())),
        TaskStoreType::Sqlite => {
            let store = SqliteTaskStore::new(db_path).await?;
            Ok(Box::new(store))
        }
    }
}

/// Case-insensitive (ASCII) substring match on title or comment, matching
/// SQLite's `LIKE` semantics.
pub(crate) fn matches_search(task: &Task, needle: &str) -> bool {
    let needle = needle.to_ascii_lowercase();
    task.title.to_ascii_lowercase().contains(&needle)
        || task.comment.to_ascii_lowercase().contains(&needle)
}
