pub mod http;
pub mod middleware;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::{HttpTokenVerifier, IdentityConfig};
pub use middleware::require_auth;

/// The user an identity provider vouches for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            uid: uid.into(),
            email: email.map(str::to_string),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no bearer token provided")]
    MissingToken,

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("identity provider request failed: {0}")]
    Provider(#[from] reqwest::Error),
}

impl AuthError {
    /// Message returned to the caller in the 401 body.
    pub fn client_message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Unauthorized - No token provided",
            AuthError::Expired => "Token expired - Please login again",
            AuthError::Invalid(_) | AuthError::Provider(_) => "Invalid authentication token",
        }
    }
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Fixed token table, for local runs and tests.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Identity>,
    expired: HashSet<String>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: &str, identity: Identity) -> Self {
        self.tokens.insert(token.to_string(), identity);
        self
    }

    pub fn with_expired_token(mut self, token: &str) -> Self {
        self.expired.insert(token.to_string());
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if self.expired.contains(token) {
            return Err(AuthError::Expired);
        }
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::Invalid("unknown token".to_string()))
    }
}
