//! Lock entity backed by the Lockitron API
//!
//! The cached state only ever changes to a value the service reported.
//! A failed call (non-200, timeout, unreadable body) leaves it untouched and
//! is kept as the entity's last error until the next successful call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::client::LockitronClient;
use crate::error::ApiError;
use crate::models::{LockState, LockStatus};

/// Capabilities the entity host expects from a lock.
///
/// Implementations never propagate failures to the host; they log and keep
/// their last known state.
#[async_trait]
pub trait LockEntity: Send + Sync {
    fn name(&self) -> &str;

    fn is_locked(&self) -> bool;

    async fn lock(&mut self);

    async fn unlock(&mut self);

    /// Pull the latest state from the device
    async fn update(&mut self);
}

pub struct LockitronLock {
    client: LockitronClient,
    name: String,
    device_id: String,
    access_token: String,
    state: LockState,
    last_updated: DateTime<Utc>,
    last_error: Option<ApiError>,
}

impl LockitronLock {
    /// Fetch the initial state and build the entity. No entity exists if the fetch fails.
    pub async fn initialize(
        client: LockitronClient,
        name: impl Into<String>,
        device_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let device_id = device_id.into();
        let access_token = access_token.into();
        let state = client.fetch_state(&device_id, &access_token).await?;

        Ok(Self {
            client,
            name: name.into(),
            device_id,
            access_token,
            state,
            last_updated: Utc::now(),
            last_error: None,
        })
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Failure of the most recent host call, cleared by the next success
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    pub fn status(&self) -> LockStatus {
        LockStatus {
            name: self.name.clone(),
            device_id: self.device_id.clone(),
            state: self.state,
            is_locked: LockEntity::is_locked(self),
            available: self.last_error.is_none(),
            last_updated: self.last_updated,
        }
    }

    /// Re-read the state from the service
    pub async fn refresh(&mut self) -> Result<LockState, ApiError> {
        let state = self
            .client
            .fetch_state(&self.device_id, &self.access_token)
            .await?;
        Ok(self.observe(state))
    }

    pub async fn request_lock(&mut self) -> Result<LockState, ApiError> {
        self.change_request(LockState::Locked).await
    }

    pub async fn request_unlock(&mut self) -> Result<LockState, ApiError> {
        self.change_request(LockState::Unlocked).await
    }

    async fn change_request(&mut self, requested: LockState) -> Result<LockState, ApiError> {
        let state = self
            .client
            .change_state(&self.device_id, &self.access_token, requested)
            .await?;

        if state != requested {
            tracing::warn!(
                "[Lockitron] {} requested {} but service reports {}",
                self.device_id,
                requested,
                state
            );
        }

        Ok(self.observe(state))
    }

    fn observe(&mut self, state: LockState) -> LockState {
        if state != self.state {
            tracing::info!(
                "[Lockitron] {} state {} -> {}",
                self.device_id,
                self.state,
                state
            );
        }
        self.state = state;
        self.last_updated = Utc::now();
        state
    }

    fn record(&mut self, context: &str, result: Result<LockState, ApiError>) {
        match result {
            Ok(_) => self.last_error = None,
            Err(e) => {
                tracing::error!("[Lockitron] {}: {}", context, e);
                self.last_error = Some(e);
            }
        }
    }
}

#[async_trait]
impl LockEntity for LockitronLock {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    async fn lock(&mut self) {
        let result = self.request_lock().await;
        self.record("Error setting lock state: lock", result);
    }

    async fn unlock(&mut self) {
        let result = self.request_unlock().await;
        self.record("Error setting lock state: unlock", result);
    }

    async fn update(&mut self) {
        let result = self.refresh().await;
        self.record("Error retrieving lock status", result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEVICE: &str = "front-door";
    const TOKEN: &str = "token123";

    fn state_body(state: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "state": state }))
    }

    async fn mount_get(server: &MockServer, response: ResponseTemplate, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/v2/locks/{}", DEVICE)))
            .and(query_param("access_token", TOKEN))
            .respond_with(response)
            .up_to_n_times(times)
            .mount(server)
            .await;
    }

    async fn mount_put(server: &MockServer, requested: &str, response: ResponseTemplate) {
        Mock::given(method("PUT"))
            .and(path(format!("/v2/locks/{}", DEVICE)))
            .and(query_param("access_token", TOKEN))
            .and(query_param("state", requested))
            .respond_with(response)
            .mount(server)
            .await;
    }

    async fn lock_for(server: &MockServer) -> Result<LockitronLock, ApiError> {
        let client = LockitronClient::new(
            Url::parse(&server.uri()).unwrap(),
            Duration::from_millis(500),
        )
        .unwrap();
        LockitronLock::initialize(client, "lockitron", DEVICE, TOKEN).await
    }

    #[tokio::test]
    async fn test_initialize_locked() {
        let server = MockServer::start().await;
        mount_get(&server, state_body("lock"), 1).await;

        let lock = lock_for(&server).await.unwrap();
        assert!(lock.is_locked());
        assert_eq!(lock.state(), LockState::Locked);
        assert_eq!(lock.name(), "lockitron");
        assert_eq!(lock.device_id(), DEVICE);
    }

    #[tokio::test]
    async fn test_initialize_fails_on_non_200() {
        let server = MockServer::start().await;
        mount_get(&server, ResponseTemplate::new(404).set_body_string("not found"), 1).await;

        let result = lock_for(&server).await;
        assert!(matches!(result, Err(ApiError::Status { .. })));
    }

    #[tokio::test]
    async fn test_lock_success_sets_locked() {
        let server = MockServer::start().await;
        mount_get(&server, state_body("unlock"), 1).await;
        mount_put(&server, "lock", state_body("lock")).await;

        let mut lock = lock_for(&server).await.unwrap();
        assert!(!lock.is_locked());

        lock.lock().await;
        assert!(lock.is_locked());
    }

    #[tokio::test]
    async fn test_lock_failure_keeps_prior_state() {
        let server = MockServer::start().await;
        mount_get(&server, state_body("unlock"), 1).await;
        mount_put(
            &server,
            "lock",
            ResponseTemplate::new(500).set_body_string("server error"),
        )
        .await;

        let mut lock = lock_for(&server).await.unwrap();
        let before = lock.status().last_updated;

        assert!(lock.request_lock().await.is_err());
        assert!(!lock.is_locked());

        lock.lock().await;
        assert!(!lock.is_locked());
        assert_eq!(lock.state(), LockState::Unlocked);
        assert_eq!(lock.status().last_updated, before);
    }

    #[tokio::test]
    async fn test_unlock_success_sets_unlocked() {
        let server = MockServer::start().await;
        mount_get(&server, state_body("lock"), 1).await;
        mount_put(&server, "unlock", state_body("unlock")).await;

        let mut lock = lock_for(&server).await.unwrap();
        assert_eq!(lock.request_unlock().await.unwrap(), LockState::Unlocked);
        assert!(!lock.is_locked());
    }

    #[tokio::test]
    async fn test_host_unlock_success() {
        let server = MockServer::start().await;
        mount_get(&server, state_body("lock"), 1).await;
        mount_put(&server, "unlock", state_body("unlock")).await;

        let mut lock = lock_for(&server).await.unwrap();
        lock.unlock().await;
        assert!(!lock.is_locked());
        assert!(lock.last_error().is_none());
        assert!(lock.status().available);
    }

    #[tokio::test]
    async fn test_host_unlock_failure_keeps_state() {
        let server = MockServer::start().await;
        mount_get(&server, state_body("lock"), 1).await;
        mount_put(
            &server,
            "unlock",
            ResponseTemplate::new(403).set_body_string("forbidden"),
        )
        .await;

        let mut lock = lock_for(&server).await.unwrap();
        lock.unlock().await;
        assert!(lock.is_locked());
        assert_eq!(lock.state(), LockState::Locked);
        assert!(matches!(lock.last_error(), Some(ApiError::Status { .. })));
        assert!(!lock.status().available);
    }

    #[tokio::test]
    async fn test_success_clears_last_error() {
        let server = MockServer::start().await;
        mount_get(&server, state_body("lock"), 1).await;
        mount_get(&server, ResponseTemplate::new(503), 1).await;
        mount_get(&server, state_body("unlock"), 1).await;

        let mut lock = lock_for(&server).await.unwrap();
        lock.update().await;
        assert!(lock.last_error().is_some());
        assert!(lock.is_locked());

        lock.update().await;
        assert!(lock.last_error().is_none());
        assert_eq!(lock.state(), LockState::Unlocked);
    }

    #[tokio::test]
    async fn test_state_echoed_from_service() {
        let server = MockServer::start().await;
        mount_get(&server, state_body("unlock"), 1).await;
        // Service refuses to lock and reports the door is still unlocked
        mount_put(&server, "lock", state_body("unlock")).await;

        let mut lock = lock_for(&server).await.unwrap();
        lock.lock().await;
        assert!(!lock.is_locked());
    }

    #[tokio::test]
    async fn test_lock_twice_is_idempotent() {
        let server = MockServer::start().await;
        mount_get(&server, state_body("unlock"), 1).await;
        Mock::given(method("PUT"))
            .and(query_param("state", "lock"))
            .respond_with(state_body("lock"))
            .expect(2)
            .mount(&server)
            .await;

        let mut lock = lock_for(&server).await.unwrap();
        lock.lock().await;
        assert_eq!(lock.state(), LockState::Locked);
        lock.lock().await;
        assert_eq!(lock.state(), LockState::Locked);
    }

    #[tokio::test]
    async fn test_refresh_overwrites_state() {
        let server = MockServer::start().await;
        mount_get(&server, state_body("lock"), 1).await;
        mount_get(&server, state_body("unlock"), 1).await;
        mount_get(&server, state_body("jammed"), 1).await;

        let mut lock = lock_for(&server).await.unwrap();
        assert!(lock.is_locked());

        lock.update().await;
        assert_eq!(lock.state(), LockState::Unlocked);

        lock.update().await;
        assert_eq!(lock.state(), LockState::Unknown);
        assert!(!lock.is_locked());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_state() {
        let server = MockServer::start().await;
        mount_get(&server, state_body("lock"), 1).await;
        mount_get(&server, ResponseTemplate::new(503), 1).await;

        let mut lock = lock_for(&server).await.unwrap();
        assert!(lock.refresh().await.is_err());
        assert!(lock.is_locked());
    }

    #[tokio::test]
    async fn test_timeout_treated_like_error() {
        let server = MockServer::start().await;
        mount_get(&server, state_body("lock"), 1).await;
        mount_put(
            &server,
            "unlock",
            state_body("unlock").set_delay(Duration::from_secs(2)),
        )
        .await;

        let mut lock = lock_for(&server).await.unwrap();
        let err = lock.request_unlock().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(lock.is_locked());
    }
}
