//! Lockitron v2 REST client
//!
//! Wraps the two endpoints the bridge needs:
//! - `GET /v2/locks/{id}?access_token=...`: current state
//! - `PUT /v2/locks/{id}?access_token=...&state=lock|unlock`: change state
//!
//! Both answer `{ "state": "lock" | "unlock" }` on success.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::config::{self, LockitronConfig};
use crate::error::{ApiError, ConfigError};
use crate::models::{LockState, LockStateResponse};

#[derive(Clone)]
pub struct LockitronClient {
    http_client: Client,
    base_url: Url,
}

impl LockitronClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ConfigError> {
        config::check_base_url(&base_url)?;

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn from_config(config: &LockitronConfig) -> Result<Self, ConfigError> {
        let base_url = config::parse_base_url(&config.base_url)?;
        Self::new(base_url, config.timeout())
    }

    /// Fetch the current state of a lock
    pub async fn fetch_state(
        &self,
        device_id: &str,
        access_token: &str,
    ) -> Result<LockState, ApiError> {
        self.request(Method::GET, device_id, &[("access_token", access_token)])
            .await
    }

    /// Ask the service to move a lock to `requested` and return the state it reports back
    pub async fn change_state(
        &self,
        device_id: &str,
        access_token: &str,
        requested: LockState,
    ) -> Result<LockState, ApiError> {
        self.request(
            Method::PUT,
            device_id,
            &[
                ("access_token", access_token),
                ("state", requested.as_api_str()),
            ],
        )
        .await
    }

    fn lock_url(&self, device_id: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::InvalidResponse(format!("base URL {} cannot hold a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v2", "locks", device_id]);
        Ok(url)
    }

    async fn request(
        &self,
        method: Method,
        device_id: &str,
        query: &[(&str, &str)],
    ) -> Result<LockState, ApiError> {
        let url = self.lock_url(device_id)?;

        let response = self
            .http_client
            .request(method, url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.without_url()))?;

        if status != StatusCode::OK {
            return Err(ApiError::Status { status, body });
        }

        let parsed: LockStateResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", e, body)))?;

        Ok(parsed.state)
    }
}
