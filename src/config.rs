use std::env;
use std::net::SocketAddr;

use crate::auth::IdentityConfig;
use crate::error::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://taskdesk.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub identity: IdentityConfig,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let identity = IdentityConfig::new_from_env()?;

        Ok(Self {
            database_url,
            bind_addr,
            identity,
        })
    }
}
