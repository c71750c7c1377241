use crate::client::view::View;
use crate::models::Task;

/// Everything that may change the client state. Task payloads are the
/// store-confirmed values, never local guesses.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetTasks(Vec<Task>),
    AddTask(Task),
    EditTask(Task),
    DeleteTask(String),
    ToggleComplete(Task),
    ToggleImportant(Task),
    SetActiveView(View),
    AddList(String),
    SetLoading(bool),
    SetError(Option<String>),
    /// Back to the initial state, used when the signed-in identity changes.
    Reset,
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SetTasks(_) => "SET_TASKS",
            Action::AddTask(_) => "ADD_TASK",
            Action::EditTask(_) => "EDIT_TASK",
            Action::DeleteTask(_) => "DELETE_TASK",
            Action::ToggleComplete(_) => "TOGGLE_COMPLETE",
            Action::ToggleImportant(_) => "TOGGLE_IMPORTANT",
            Action::SetActiveView(_) => "SET_ACTIVE_VIEW",
            Action::AddList(_) => "ADD_LIST",
            Action::SetLoading(_) => "SET_LOADING",
            Action::SetError(_) => "SET_ERROR",
            Action::Reset => "RESET",
        }
    }
}
