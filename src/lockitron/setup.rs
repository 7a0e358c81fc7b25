//! Platform setup: build the configured lock and hand it to the host

use super::client::LockitronClient;
use super::entity::{LockEntity, LockitronLock};
use crate::config::LockitronConfig;
use crate::error::ConfigError;

/// Fetch the initial state of the configured lock and register it through
/// `add_entities`. When the fetch fails the error is logged and nothing is
/// registered; `Ok(false)` is returned.
pub async fn setup_platform<F>(config: &LockitronConfig, add_entities: F) -> Result<bool, ConfigError>
where
    F: FnOnce(Vec<LockitronLock>),
{
    let client = LockitronClient::from_config(config)?;

    match LockitronLock::initialize(client, &config.name, &config.id, &config.access_token).await
    {
        Ok(lock) => {
            tracing::info!(
                "[Lockitron] Registered {} ({}), initial state {}",
                lock.name(),
                config.id,
                lock.state()
            );
            add_entities(vec![lock]);
            Ok(true)
        }
        Err(e) => {
            tracing::error!(
                "[Lockitron] Error retrieving lock status during init: {}",
                e
            );
            Ok(false)
        }
    }
}
