use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdesk::api::router;
use taskdesk::auth::HttpTokenVerifier;
use taskdesk::config::AppConfig;
use taskdesk::state::AppState;
use taskdesk::store::SqliteTaskStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "taskdesk=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let store = SqliteTaskStore::connect(&config.database_url).await?;
    let verifier = HttpTokenVerifier::new(config.identity.clone())?;

    let state = AppState {
        store: Arc::new(store),
        verifier: Arc::new(verifier),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
