use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::{AuthError, Identity, TokenVerifier};
use crate::error::AppError;

const EXPIRED_TOKEN_CODE: &str = "auth/id-token-expired";

#[derive(Clone, Debug)]
pub struct IdentityConfig {
    pub verify_url: String,
}

impl IdentityConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let verify_url = env::var("IDENTITY_VERIFY_URL")
            .map_err(|_| AppError::Config("IDENTITY_VERIFY_URL is not set".to_string()))?;
        Ok(Self { verify_url })
    }
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    uid: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct VerifyErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Asks the identity provider's verification endpoint who a token belongs to.
pub struct HttpTokenVerifier {
    client: Client,
    config: IdentityConfig,
}

impl HttpTokenVerifier {
    pub fn new(config: IdentityConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let response = self
            .client
            .get(&self.config.verify_url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: VerifyErrorBody = response.json().await.unwrap_or_default();
            if body.code.as_deref() == Some(EXPIRED_TOKEN_CODE) {
                return Err(AuthError::Expired);
            }
            warn!("identity provider rejected token: {}", status);
            return Err(AuthError::Invalid(
                body.message.unwrap_or_else(|| status.to_string()),
            ));
        }

        let verified: VerifyResponse = response.json().await?;
        debug!("token verified for user {}", verified.uid);
        Ok(Identity {
            uid: verified.uid,
            email: verified.email,
        })
    }
}
