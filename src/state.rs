use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::store::TaskStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}
