use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use taskdesk::auth::Identity;
use taskdesk::client::{Action, StateHandle, TaskActions, View};
use taskdesk::models::{NewTask, Task, TaskPatch};
use taskdesk::store::{SqliteTaskStore, StoreError, Subscription, TaskCallback, TaskStore};

/// Delegates to a real store, counts calls, and can be told to fail writes.
struct RecordingStore {
    inner: SqliteTaskStore,
    calls: AtomicUsize,
    fail_writes: bool,
    write_delay: Option<Duration>,
}

impl RecordingStore {
    async fn new(fail_writes: bool) -> Arc<Self> {
        Self::build(fail_writes, None).await
    }

    /// Creates take a while, so submissions overlap.
    async fn slow() -> Arc<Self> {
        Self::build(false, Some(Duration::from_millis(100))).await
    }

    async fn build(fail_writes: bool, write_delay: Option<Duration>) -> Arc<Self> {
        let inner = SqliteTaskStore::in_memory()
            .await
            .expect("Failed to create in-memory store");
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
            fail_writes,
            write_delay,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn write(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TaskStore for RecordingStore {
    fn subscribe_tasks(&self, user_id: &str, callback: TaskCallback) -> Subscription {
        self.inner.subscribe_tasks(user_id, callback)
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError> {
        self.write()?;
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.create_task(task).await
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task, StoreError> {
        self.write()?;
        self.inner.update_task(id, patch).await
    }

    async fn delete_task(&self, id: &str) -> Result<String, StoreError> {
        self.write()?;
        self.inner.delete_task(id).await
    }

    async fn fetch_tasks(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        self.inner.fetch_tasks(user_id).await
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        self.inner.get_task(id).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }
}

fn user() -> Identity {
    Identity::new("u1", Some("u1@example.com"))
}

fn actions(store: &Arc<RecordingStore>, state: &StateHandle) -> TaskActions {
    TaskActions::new(store.clone(), state.clone(), user())
}

/// Puts a stored task into the client state the way a subscription would.
async fn seed(store: &Arc<RecordingStore>, state: &StateHandle, title: &str) -> Task {
    let task = store
        .inner
        .create_task(NewTask::new("u1", title))
        .await
        .expect("Failed to seed task");
    let tasks = store.inner.fetch_tasks("u1").await.expect("fetch failed");
    state.dispatch(Action::SetTasks(tasks));
    task
}

#[tokio::test]
async fn test_whitespace_title_never_reaches_store() {
    let store = RecordingStore::new(false).await;
    let state = StateHandle::default();
    let rx = state.subscribe();

    let created = actions(&store, &state).add_task("   ").await;

    assert!(created.is_none());
    assert_eq!(store.calls(), 0);
    assert!(!rx.has_changed().expect("state channel closed"));
}

#[tokio::test]
async fn test_add_task_in_my_day_view() {
    let store = RecordingStore::new(false).await;
    let state = StateHandle::default();

    let created = actions(&store, &state)
        .add_task("  Buy milk ")
        .await
        .expect("task should be created");

    assert_eq!(created.title, "Buy milk");
    assert!(created.my_day);
    assert_eq!(created.list, "personal");
    assert_eq!(created.user_id, "u1");

    let snapshot = state.snapshot();
    assert_eq!(snapshot.tasks, vec![created]);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.error, None);
}

#[tokio::test]
async fn test_add_task_in_list_view_files_under_list() {
    let store = RecordingStore::new(false).await;
    let state = StateHandle::default();
    let actions = actions(&store, &state);

    assert!(actions.create_list("Groceries"));
    actions.set_active_view(View::from_id("list-2"));
    let created = actions.add_task("Eggs").await.expect("task should be created");

    assert_eq!(created.list, "list-2");
    assert!(!created.my_day);
    assert_eq!(state.snapshot().visible_tasks().active.len(), 1);
}

#[tokio::test]
async fn test_add_task_ignored_while_loading() {
    let store = RecordingStore::new(false).await;
    let state = StateHandle::default();
    state.dispatch(Action::SetLoading(true));

    assert!(actions(&store, &state).add_task("Later").await.is_none());
    assert_eq!(store.calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_overlapping_adds_create_one_task() {
    let store = RecordingStore::slow().await;
    let state = StateHandle::default();

    let first = tokio::spawn({
        let actions = actions(&store, &state);
        async move { actions.add_task("Once").await }
    });
    let second = tokio::spawn({
        let actions = actions(&store, &state);
        async move { actions.add_task("Once").await }
    });
    let first = first.await.expect("task panicked");
    let second = second.await.expect("task panicked");

    assert_eq!(first.is_some() as usize + second.is_some() as usize, 1);
    assert_eq!(store.calls(), 1);
    assert_eq!(state.snapshot().tasks.len(), 1);
}

#[tokio::test]
async fn test_failed_add_sets_error_and_keeps_tasks() {
    let store = RecordingStore::new(true).await;
    let state = StateHandle::default();

    assert!(actions(&store, &state).add_task("Doomed").await.is_none());

    let snapshot = state.snapshot();
    assert_eq!(store.calls(), 1);
    assert!(snapshot.tasks.is_empty());
    assert!(!snapshot.loading);
    assert_eq!(snapshot.error.as_deref(), Some("Failed to add task"));

    actions(&store, &state).dismiss_error();
    assert_eq!(state.snapshot().error, None);
}

#[tokio::test]
async fn test_toggle_important_replaces_only_that_task() {
    let store = RecordingStore::new(false).await;
    let state = StateHandle::default();
    seed(&store, &state, "a").await;
    let b = seed(&store, &state, "b").await;
    let before = state.snapshot();

    let updated = actions(&store, &state)
        .toggle_important(&b.id)
        .await
        .expect("toggle should succeed");

    assert!(updated.important);
    let after = state.snapshot();
    assert_eq!(after.tasks.len(), before.tasks.len());
    for (old, new) in before.tasks.iter().zip(after.tasks.iter()) {
        if old.id == b.id {
            assert_eq!(*new, updated);
        } else {
            assert_eq!(new, old);
        }
    }
}

#[tokio::test]
async fn test_toggle_complete_moves_task_to_completed() {
    let store = RecordingStore::new(false).await;
    let state = StateHandle::default();
    state.dispatch(Action::SetActiveView(View::All));
    let task = seed(&store, &state, "Finish report").await;
    let actions = actions(&store, &state);

    actions.toggle_complete(&task.id).await.expect("toggle should succeed");
    let snapshot = state.snapshot();
    let visible = snapshot.visible_tasks();
    assert!(visible.active.is_empty());
    assert_eq!(visible.completed[0].id, task.id);

    actions.toggle_complete(&task.id).await.expect("toggle back should succeed");
    assert!(!state.snapshot().task(&task.id).unwrap().completed);
}

#[tokio::test]
async fn test_edit_title_skips_blank_and_unchanged() {
    let store = RecordingStore::new(false).await;
    let state = StateHandle::default();
    let task = seed(&store, &state, "Draft").await;
    let actions = actions(&store, &state);

    assert!(actions.edit_title(&task.id, "  ").await.is_none());
    assert!(actions.edit_title(&task.id, "Draft").await.is_none());
    assert_eq!(store.calls(), 0);

    let edited = actions
        .edit_title(&task.id, " Final ")
        .await
        .expect("edit should succeed");
    assert_eq!(edited.title, "Final");
    assert_eq!(state.snapshot().task(&task.id).unwrap().title, "Final");
}

#[tokio::test]
async fn test_failed_update_leaves_task_untouched() {
    let store = RecordingStore::new(true).await;
    let state = StateHandle::default();
    let task = seed(&store, &state, "Stable").await;

    assert!(actions(&store, &state).toggle_important(&task.id).await.is_none());

    let snapshot = state.snapshot();
    assert_eq!(snapshot.task(&task.id), Some(&task));
    assert_eq!(snapshot.error.as_deref(), Some("Failed to update task"));
}

#[tokio::test]
async fn test_delete_task_removes_it() {
    let store = RecordingStore::new(false).await;
    let state = StateHandle::default();
    let task = seed(&store, &state, "Trash").await;

    let id = actions(&store, &state).delete_task(&task.id).await;
    assert_eq!(id.as_deref(), Some(task.id.as_str()));
    assert!(state.snapshot().tasks.is_empty());
    assert!(store.inner.get_task(&task.id).await.expect("query failed").is_none());
}

#[tokio::test]
async fn test_failed_delete_sets_error() {
    let store = RecordingStore::new(true).await;
    let state = StateHandle::default();
    let task = seed(&store, &state, "Sticky").await;

    assert!(actions(&store, &state).delete_task(&task.id).await.is_none());
    let snapshot = state.snapshot();
    assert_eq!(snapshot.tasks.len(), 1);
    assert_eq!(snapshot.error.as_deref(), Some("Failed to delete task"));
}

#[tokio::test]
async fn test_create_list_ignores_blank_names() {
    let store = RecordingStore::new(false).await;
    let state = StateHandle::default();
    let actions = actions(&store, &state);

    assert!(!actions.create_list("  "));
    assert!(actions.create_list(" Work "));
    assert!(actions.create_list("Work"));

    let lists = state.snapshot().lists;
    let ids: Vec<&str> = lists.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["personal", "list-2", "list-3"]);
    assert_eq!(lists[1].name, "Work");
}
