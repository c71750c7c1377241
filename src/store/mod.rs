pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::models::{NewTask, Task, TaskPatch};

pub use sqlite::SqliteTaskStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Task not found: {0}")]
    NotFound(String),
}

/// Receives the complete task set of one user each time it changes.
pub type TaskCallback = Arc<dyn Fn(Result<Vec<Task>, StoreError>) + Send + Sync>;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Starts a live query over `user_id`'s tasks. The callback is invoked
    /// with the current set right away and again after every change.
    fn subscribe_tasks(&self, user_id: &str, callback: TaskCallback) -> Subscription;

    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError>;

    /// Merges `patch` into the stored task and returns the merged task.
    async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task, StoreError>;

    /// Removes the task. Deleting an id that does not exist is not an error.
    async fn delete_task(&self, id: &str) -> Result<String, StoreError>;

    async fn fetch_tasks(&self, user_id: &str) -> Result<Vec<Task>, StoreError>;

    async fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Handle to a running live query. Dropping it stops the feed.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    pub fn unsubscribe(self) {
        self.handle.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
