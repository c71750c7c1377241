use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::auth::AuthError;
use crate::error::AppError;
use crate::state::AppState;

/// Rejects requests without a valid bearer token. On success the caller's
/// `Identity` is stored in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    debug!("auth header received: {}", if header.is_some() { "yes" } else { "no" });

    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let identity = state.verifier.verify(token).await.map_err(|e| {
        warn!("auth middleware error: {}", e);
        e
    })?;

    debug!("token verified for user {}", identity.uid);
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
