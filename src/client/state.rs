use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::client::action::Action;
use crate::client::reducer::reduce;
use crate::client::view::{self, SidebarEntry, View, VisibleTasks};
use crate::models::{Task, TaskList};

#[derive(Debug, Clone, PartialEq)]
pub struct ClientState {
    pub tasks: Vec<Task>,
    pub lists: Vec<TaskList>,
    pub active_view: View,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            lists: vec![TaskList::personal()],
            active_view: View::MyDay,
            loading: false,
            error: None,
        }
    }
}

impl ClientState {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn visible_tasks(&self) -> VisibleTasks<'_> {
        view::visible_tasks(&self.tasks, &self.active_view)
    }

    pub fn sidebar(&self) -> Vec<SidebarEntry> {
        view::sidebar(self)
    }

    pub fn title(&self) -> String {
        self.active_view.title(&self.lists)
    }
}

/// Sole writer of the client state. Every change goes through `reduce`
/// under the channel lock, so actions apply in dispatch order. Renderers
/// follow along through `subscribe`.
#[derive(Clone)]
pub struct StateHandle {
    tx: Arc<watch::Sender<ClientState>>,
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new(ClientState::default())
    }
}

impl StateHandle {
    pub fn new(initial: ClientState) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn dispatch(&self, action: Action) {
        debug!("dispatch {}", action.kind());
        self.tx.send_modify(|state| apply(state, action));
    }

    /// Dispatches only if `guard` accepts the state seen under the lock.
    /// Returns whether the action was applied.
    pub fn dispatch_if(
        &self,
        guard: impl FnOnce(&ClientState) -> bool,
        action: Action,
    ) -> bool {
        self.tx.send_if_modified(|state| {
            if !guard(state) {
                debug!("dropped stale {}", action.kind());
                return false;
            }
            debug!("dispatch {}", action.kind());
            apply(state, action);
            true
        })
    }

    pub fn snapshot(&self) -> ClientState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.tx.subscribe()
    }
}

fn apply(state: &mut ClientState, action: Action) {
    let current = std::mem::take(state);
    *state = reduce(current, action);
}
