//! Lock control handlers
//!
//! Commands go through the same `LockEntity` calls the poller uses; a failed
//! call is reported as 502 with the state left as it was.

use axum::{extract::State, response::IntoResponse, Json};

use crate::api::ApiState;
use crate::error::AppError;
use crate::lockitron::{LockEntity, LockitronLock};
use crate::models::LockStatus;

/// GET /api/lock - Current lock status (cached, no API call)
pub async fn get_lock(State(state): State<ApiState>) -> impl IntoResponse {
    let entity = state.lock.lock().await;
    Json(entity.status())
}

/// POST /api/lock/lock - Lock the door
pub async fn lock_lock(State(state): State<ApiState>) -> Result<impl IntoResponse, AppError> {
    let mut entity = state.lock.lock().await;
    entity.lock().await;
    command_result(&entity)
}

/// POST /api/lock/unlock - Unlock the door
pub async fn unlock_lock(State(state): State<ApiState>) -> Result<impl IntoResponse, AppError> {
    let mut entity = state.lock.lock().await;
    entity.unlock().await;
    command_result(&entity)
}

/// POST /api/lock/update - Refresh from the Lockitron API
pub async fn update_lock(State(state): State<ApiState>) -> Result<impl IntoResponse, AppError> {
    let mut entity = state.lock.lock().await;
    entity.update().await;
    command_result(&entity)
}

fn command_result(entity: &LockitronLock) -> Result<Json<LockStatus>, AppError> {
    match entity.last_error() {
        Some(e) => Err(AppError::Lockitron(e.to_string())),
        None => Ok(Json(entity.status())),
    }
}
