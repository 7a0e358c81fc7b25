//! HTTP handlers module

mod lock;

pub use self::lock::*;

use axum::{response::IntoResponse, Json};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "lockitron-bridge".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
