use std::sync::Arc;

use tracing::{debug, error};

use crate::auth::Identity;
use crate::client::action::Action;
use crate::client::state::StateHandle;
use crate::client::view::View;
use crate::models::{NewTask, Task, TaskPatch};
use crate::store::{StoreError, TaskStore};

const ADD_FAILED: &str = "Failed to add task";
const UPDATE_FAILED: &str = "Failed to update task";
const DELETE_FAILED: &str = "Failed to delete task";

/// User-triggered operations for the signed-in user. Each one awaits the
/// store and dispatches only the confirmed result.
#[derive(Clone)]
pub struct TaskActions {
    store: Arc<dyn TaskStore>,
    state: StateHandle,
    user: Identity,
}

impl TaskActions {
    pub fn new(store: Arc<dyn TaskStore>, state: StateHandle, user: Identity) -> Self {
        Self { store, state, user }
    }

    pub fn user(&self) -> &Identity {
        &self.user
    }

    /// Creates a task from the add-task input. Blank input and submissions
    /// while a request is in flight are ignored.
    pub async fn add_task(&self, input: &str) -> Option<Task> {
        let title = input.trim();
        if title.is_empty() {
            return None;
        }

        let view = self.state.snapshot().active_view;
        let mut new_task = NewTask::new(self.user.uid.clone(), title);
        new_task.my_day = view == View::MyDay;
        new_task.list = view.list_for_new_task().to_string();

        // Checked and set under one lock.
        if !self
            .state
            .dispatch_if(|state| !state.loading, Action::SetLoading(true))
        {
            debug!("add task ignored while loading");
            return None;
        }

        match self.store.create_task(new_task).await {
            Ok(task) => {
                self.state.dispatch(Action::AddTask(task.clone()));
                Some(task)
            }
            Err(e) => {
                self.fail(ADD_FAILED, e);
                None
            }
        }
    }

    /// Renames a task. Blank input or an unchanged title does nothing.
    pub async fn edit_title(&self, task_id: &str, input: &str) -> Option<Task> {
        let current = self.state.snapshot().task(task_id)?.title.clone();
        if input.trim().is_empty() || input == current {
            return None;
        }

        let task = self
            .update(task_id, TaskPatch::title(input), UPDATE_FAILED)
            .await?;
        self.state.dispatch(Action::EditTask(task.clone()));
        Some(task)
    }

    pub async fn toggle_complete(&self, task_id: &str) -> Option<Task> {
        let completed = self.state.snapshot().task(task_id)?.completed;
        let task = self
            .update(task_id, TaskPatch::completed(!completed), UPDATE_FAILED)
            .await?;
        self.state.dispatch(Action::ToggleComplete(task.clone()));
        Some(task)
    }

    pub async fn toggle_important(&self, task_id: &str) -> Option<Task> {
        let important = self.state.snapshot().task(task_id)?.important;
        let task = self
            .update(task_id, TaskPatch::important(!important), UPDATE_FAILED)
            .await?;
        self.state.dispatch(Action::ToggleImportant(task.clone()));
        Some(task)
    }

    pub async fn delete_task(&self, task_id: &str) -> Option<String> {
        match self.store.delete_task(task_id).await {
            Ok(id) => {
                self.state.dispatch(Action::DeleteTask(id.clone()));
                Some(id)
            }
            Err(e) => {
                self.fail(DELETE_FAILED, e);
                None
            }
        }
    }

    /// Adds a local list. Blank names are ignored.
    pub fn create_list(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.state.dispatch(Action::AddList(name.to_string()));
        true
    }

    pub fn set_active_view(&self, view: View) {
        self.state.dispatch(Action::SetActiveView(view));
    }

    pub fn dismiss_error(&self) {
        self.state.dispatch(Action::SetError(None));
    }

    async fn update(&self, task_id: &str, patch: TaskPatch, message: &str) -> Option<Task> {
        match self.store.update_task(task_id, patch).await {
            Ok(task) => Some(task),
            Err(e) => {
                self.fail(message, e);
                None
            }
        }
    }

    fn fail(&self, message: &str, err: StoreError) {
        error!("{}: {}", message, err);
        self.state.dispatch(Action::SetError(Some(message.to_string())));
    }
}
