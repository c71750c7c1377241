use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::auth::Identity;
use crate::client::action::Action;
use crate::client::actions::TaskActions;
use crate::client::state::{ClientState, StateHandle};
use crate::models::Task;
use crate::store::{StoreError, Subscription, TaskCallback, TaskStore};

const LOAD_FAILED: &str = "Failed to load tasks";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    Resolving,
    SignedOut,
    SignedIn(Identity),
}

/// Which surface the user should be looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Loading,
    Login,
    Tasks,
}

/// Follows the signed-in identity and keeps exactly one live task
/// subscription running for it.
pub struct SessionController {
    store: Arc<dyn TaskStore>,
    state: StateHandle,
    phase: AuthPhase,
    subscription: Option<Subscription>,
    generation: Arc<AtomicU64>,
}

impl SessionController {
    pub fn new(store: Arc<dyn TaskStore>, state: StateHandle) -> Self {
        Self {
            store,
            state,
            phase: AuthPhase::Resolving,
            subscription: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn phase(&self) -> &AuthPhase {
        &self.phase
    }

    pub fn route(&self) -> Route {
        match self.phase {
            AuthPhase::Resolving => Route::Loading,
            AuthPhase::SignedOut => Route::Login,
            AuthPhase::SignedIn(_) => Route::Tasks,
        }
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    pub fn has_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    /// Handlers bound to the current user, if anyone is signed in.
    pub fn actions(&self) -> Option<TaskActions> {
        match &self.phase {
            AuthPhase::SignedIn(user) => Some(TaskActions::new(
                self.store.clone(),
                self.state.clone(),
                user.clone(),
            )),
            _ => None,
        }
    }

    pub fn on_auth_state_changed(&mut self, user: Option<Identity>) {
        match user {
            Some(user) => {
                if let AuthPhase::SignedIn(current) = &self.phase {
                    if current.uid == user.uid && self.subscription.is_some() {
                        self.phase = AuthPhase::SignedIn(user);
                        return;
                    }
                }
                self.stop_subscription();
                info!("user {} signed in", user.uid);
                self.state.dispatch(Action::Reset);
                self.state.dispatch(Action::SetLoading(true));
                self.start_subscription(&user.uid);
                self.phase = AuthPhase::SignedIn(user);
            }
            None => self.sign_out(),
        }
    }

    pub fn logout(&mut self) {
        self.sign_out();
    }

    /// Consumes auth-state reports until the sender goes away, then stops
    /// the subscription.
    pub async fn run(&mut self, mut events: mpsc::Receiver<Option<Identity>>) {
        while let Some(user) = events.recv().await {
            self.on_auth_state_changed(user);
        }
        info!("auth listener closed, stopping task subscription");
        self.stop_subscription();
    }

    fn sign_out(&mut self) {
        if let AuthPhase::SignedIn(user) = &self.phase {
            info!("user {} signed out", user.uid);
        }
        self.stop_subscription();
        self.state.dispatch(Action::Reset);
        self.phase = AuthPhase::SignedOut;
    }

    fn start_subscription(&mut self, user_id: &str) {
        let current = self.generation.load(Ordering::SeqCst);
        let generation = self.generation.clone();
        let state = self.state.clone();

        let callback: TaskCallback = Arc::new(move |result: Result<Vec<Task>, StoreError>| {
            let is_current = |_: &ClientState| generation.load(Ordering::SeqCst) == current;
            let action = match result {
                Ok(tasks) => Action::SetTasks(tasks),
                Err(e) => {
                    error!("task subscription failed: {}", e);
                    Action::SetError(Some(LOAD_FAILED.to_string()))
                }
            };
            state.dispatch_if(is_current, action);
        });

        self.subscription = Some(self.store.subscribe_tasks(user_id, callback));
    }

    fn stop_subscription(&mut self) {
        // Bump first so an in-flight payload of the old feed is rejected.
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop_subscription();
    }
}
