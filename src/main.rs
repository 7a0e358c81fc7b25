//! lockitron-bridge - Lockitron cloud lock bridge
//!
//! Registers a Lockitron lock, keeps its state fresh by polling the
//! Lockitron API, and exposes lock/unlock commands over HTTP.

mod api;
mod config;
mod error;
mod lockitron;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::ApiState;
use crate::lockitron::{LockPoller, SharedLock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lockitron_bridge=info,tower_http=debug".into()),
        )
        .init();

    tracing::info!("Starting lockitron-bridge...");

    // Load configuration
    let config = config::Config::load()?;
    tracing::info!("Configuration loaded (lock {})", config.lock.id);

    // Register the configured lock
    let mut entities: Vec<SharedLock> = Vec::new();
    lockitron::setup_platform(&config.lock, |locks| {
        entities.extend(locks.into_iter().map(|lock| Arc::new(Mutex::new(lock))));
    })
    .await?;

    let lock = entities
        .first()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No lock registered, see errors above"))?;

    // Start the poller
    let poller = Arc::new(LockPoller::new(entities, config.lock.scan_interval()));
    tokio::spawn(async move {
        poller.start().await;
    });

    // Build application router
    let cors = CorsLayer::permissive();

    let app = api::routes().with_state(ApiState { lock }).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
