use crate::client::action::Action;
use crate::client::state::ClientState;
use crate::models::{ListColor, Task, TaskList};

/// Pure state transition. No I/O, no failure path.
pub fn reduce(state: ClientState, action: Action) -> ClientState {
    match action {
        Action::SetTasks(tasks) => ClientState {
            tasks,
            loading: false,
            ..state
        },
        Action::AddTask(task) => {
            let mut tasks = Vec::with_capacity(state.tasks.len() + 1);
            tasks.push(task);
            tasks.extend(state.tasks);
            ClientState {
                tasks,
                loading: false,
                ..state
            }
        }
        Action::EditTask(task) | Action::ToggleComplete(task) | Action::ToggleImportant(task) => {
            ClientState {
                tasks: replace_by_id(state.tasks, task),
                loading: false,
                ..state
            }
        }
        Action::DeleteTask(id) => {
            let mut tasks = state.tasks;
            tasks.retain(|t| t.id != id);
            ClientState {
                tasks,
                loading: false,
                ..state
            }
        }
        Action::SetActiveView(active_view) => ClientState {
            active_view,
            ..state
        },
        Action::AddList(name) => {
            let mut lists = state.lists;
            let id = format!("list-{}", lists.len() + 1);
            lists.push(TaskList {
                id,
                name,
                color: ListColor::Blue,
            });
            ClientState { lists, ..state }
        }
        Action::SetLoading(loading) => ClientState { loading, ..state },
        Action::SetError(error) => ClientState {
            error,
            loading: false,
            ..state
        },
        Action::Reset => ClientState::default(),
    }
}

// Unknown ids are dropped, never inserted.
fn replace_by_id(tasks: Vec<Task>, task: Task) -> Vec<Task> {
    let mut tasks = tasks;
    if let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) {
        *slot = task;
    }
    tasks
}
