use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{NewTask, Task, TaskPatch};
use crate::store::{StoreError, Subscription, TaskCallback, TaskStore};

const CHANGE_CHANNEL_CAPACITY: usize = 256;

const TASK_COLUMNS: &str = "id, title, completed, important, my_day, list, date, time, user_id, created_at, updated_at";

/// Task documents kept in SQLite. Writes publish the owning user id on a
/// broadcast channel so live queries can re-run.
#[derive(Clone)]
pub struct SqliteTaskStore {
    db: SqlitePool,
    changes: broadcast::Sender<String>,
}

impl SqliteTaskStore {
    pub fn new(db: SqlitePool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { db, changes }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// A private in-memory database. The pool is pinned to a single
    /// connection that never expires, otherwise the data would vanish.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }

    fn notify(&self, user_id: &str) {
        // No live queries means no receivers, which is fine.
        let _ = self.changes.send(user_id.to_string());
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn subscribe_tasks(&self, user_id: &str, callback: TaskCallback) -> Subscription {
        let store = self.clone();
        let user_id = user_id.to_string();
        // Subscribe before the first query so no write slips in between.
        let mut rx = self.changes.subscribe();

        info!("starting task subscription for user {}", user_id);
        let handle = tokio::spawn(async move {
            callback(store.fetch_tasks(&user_id).await);

            loop {
                match rx.recv().await {
                    Ok(changed) if changed == user_id => {}
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("task subscription lagged by {} changes, reloading", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }

                debug!("tasks changed for user {}, reloading", user_id);
                callback(store.fetch_tasks(&user_id).await);
            }
        });

        Subscription::new(handle)
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = now();

        sqlx::query(
            r#"
            INSERT INTO tasks
                (id, title, completed, important, my_day, list, date, time,
                user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&task.title)
        .bind(task.completed)
        .bind(task.important)
        .bind(task.my_day)
        .bind(&task.list)
        .bind(&task.date)
        .bind(&task.time)
        .bind(&task.user_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        debug!("task {} created for user {}", id, task.user_id);
        self.notify(&task.user_id);

        Ok(Task {
            id,
            title: task.title,
            completed: task.completed,
            important: task.important,
            my_day: task.my_day,
            list: task.list,
            date: task.date,
            time: task.time,
            user_id: task.user_id,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task, StoreError> {
        // One statement, so concurrent patches to the same task each keep
        // the fields the other did not touch.
        let sql = format!(
            r#"
            UPDATE tasks
            SET title = COALESCE(?, title),
                completed = COALESCE(?, completed),
                important = COALESCE(?, important),
                my_day = COALESCE(?, my_day),
                list = COALESCE(?, list),
                date = CASE WHEN ? THEN ? ELSE date END,
                time = CASE WHEN ? THEN ? ELSE time END,
                updated_at = ?
            WHERE id = ?
            RETURNING {}
            "#,
            TASK_COLUMNS
        );
        let date = patch.date_value();
        let time = patch.time_value();

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(patch.trimmed_title())
            .bind(patch.completed)
            .bind(patch.important)
            .bind(patch.my_day)
            .bind(patch.list_id())
            .bind(date.is_some())
            .bind(date.flatten())
            .bind(time.is_some())
            .bind(time.flatten())
            .bind(now())
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        debug!("task {} updated", id);
        self.notify(&task.user_id);

        Ok(task)
    }

    async fn delete_task(&self, id: &str) -> Result<String, StoreError> {
        let owner: Option<(String,)> = sqlx::query_as("SELECT user_id FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        let Some((user_id,)) = owner else {
            debug!("task {} already absent", id);
            return Ok(id.to_string());
        };

        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        debug!("task {} deleted", id);
        self.notify(&user_id);

        Ok(id.to_string())
    }

    async fn fetch_tasks(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = ? ORDER BY created_at DESC, id",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(tasks)
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(task)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }
}
