//! Filter lenses over the task collection: which tasks a view shows, the
//! sidebar badge counts, and view titles.

use crate::client::state::ClientState;
use crate::models::{DEFAULT_LIST_ID, Task, TaskList};

pub const MY_DAY: &str = "my-day";
pub const IMPORTANT: &str = "important";
pub const PLANNED: &str = "planned";
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    MyDay,
    Important,
    Planned,
    All,
    List(String),
}

impl View {
    /// Reserved ids map to the built-in views; anything else names a list.
    pub fn from_id(id: &str) -> Self {
        match id {
            MY_DAY => View::MyDay,
            IMPORTANT => View::Important,
            PLANNED => View::Planned,
            ALL => View::All,
            other => View::List(other.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            View::MyDay => MY_DAY,
            View::Important => IMPORTANT,
            View::Planned => PLANNED,
            View::All => ALL,
            View::List(id) => id,
        }
    }

    pub fn is_reserved(&self) -> bool {
        !matches!(self, View::List(_))
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            View::MyDay => task.my_day,
            View::Important => task.important,
            View::Planned => task.is_planned(),
            View::All => true,
            View::List(id) => task.list == *id,
        }
    }

    pub fn title(&self, lists: &[TaskList]) -> String {
        match self {
            View::MyDay => "My Day".to_string(),
            View::Important => "Important".to_string(),
            View::Planned => "Planned".to_string(),
            View::All => "All Tasks".to_string(),
            View::List(id) => lists
                .iter()
                .find(|l| l.id == *id)
                .map(|l| l.name.clone())
                .unwrap_or_else(|| "Tasks".to_string()),
        }
    }

    /// The list a task typed into this view is filed under.
    pub fn list_for_new_task(&self) -> &str {
        match self {
            View::List(id) => id,
            _ => DEFAULT_LIST_ID,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct VisibleTasks<'a> {
    pub active: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

impl VisibleTasks<'_> {
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.completed.is_empty()
    }
}

pub fn visible_tasks<'a>(tasks: &'a [Task], view: &View) -> VisibleTasks<'a> {
    let (completed, active): (Vec<&Task>, Vec<&Task>) = tasks
        .iter()
        .filter(|t| view.matches(t))
        .partition(|t| t.completed);
    VisibleTasks { active, completed }
}

/// Open tasks a view would show.
pub fn badge_count(tasks: &[Task], view: &View) -> usize {
    tasks
        .iter()
        .filter(|t| !t.completed && view.matches(t))
        .count()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub view: View,
    pub label: String,
    pub count: usize,
    pub active: bool,
}

/// Built-in views first, then one entry per list in list order.
pub fn sidebar(state: &ClientState) -> Vec<SidebarEntry> {
    let builtin = [View::MyDay, View::Important, View::Planned, View::All];
    let lists = state.lists.iter().map(|l| View::List(l.id.clone()));

    builtin
        .into_iter()
        .chain(lists)
        .map(|view| SidebarEntry {
            label: view.title(&state.lists),
            count: badge_count(&state.tasks, &view),
            active: view == state.active_view,
            view,
        })
        .collect()
}
