use std::net::SocketAddr;
use std::sync::Arc;

use cdc_api::ratelimit::TokenBucketLimiter;
use cdc_api::state::{AppState, AuthConfig};
use cdc_api::app;
use cdc_store::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cdc_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cdc_store::app_config::Config::load()?;
    tracing::info!("Starting CDC workflow API on port {}", config.server.port);

    let store = Arc::new(MemoryStore::new());
    let limiter = Arc::new(TokenBucketLimiter::new(
        config.rate_limit.burst,
        config.rate_limit.per_minute,
    ));

    let state = AppState::new(
        store.clone(),
        store,
        limiter,
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    );

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
