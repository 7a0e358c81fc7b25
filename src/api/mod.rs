//! API module - HTTP handlers and routes

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::lockitron::SharedLock;

/// State shared by all handlers
#[derive(Clone)]
pub struct ApiState {
    pub lock: SharedLock,
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::health_check))
        // Lock control
        .route("/api/lock", get(handlers::get_lock))
        .route("/api/lock/lock", post(handlers::lock_lock))
        .route("/api/lock/unlock", post(handlers::unlock_lock))
        .route("/api/lock/update", post(handlers::update_lock))
}
