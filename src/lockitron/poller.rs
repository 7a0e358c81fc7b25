//! Periodic state refresh for registered locks

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::interval;

use super::entity::{LockEntity, LockitronLock};

/// A registered lock shared between the poller and the control API.
/// Holding the mutex for a whole request keeps calls on one lock serialized.
pub type SharedLock = Arc<Mutex<LockitronLock>>;

/// Poller that runs in the background
pub struct LockPoller {
    locks: Vec<SharedLock>,
    scan_interval: Duration,
}

impl LockPoller {
    pub fn new(locks: Vec<SharedLock>, scan_interval: Duration) -> Self {
        Self {
            locks,
            scan_interval,
        }
    }

    /// Start the poll loop
    pub async fn start(self: Arc<Self>) {
        tracing::info!(
            "Starting lock poller ({} locks, every {:?})...",
            self.locks.len(),
            self.scan_interval
        );

        let mut interval_timer = interval(self.scan_interval);
        // The first tick completes immediately; state was just fetched during setup
        interval_timer.tick().await;

        loop {
            interval_timer.tick().await;
            self.poll_once().await;
        }
    }

    /// Refresh every lock once. Failures are logged by the entity.
    pub async fn poll_once(&self) {
        for lock in &self.locks {
            let mut lock = lock.lock().await;
            lock.update().await;
            tracing::debug!("[Lockitron] {} polled: {}", lock.device_id(), lock.state());
        }
    }
}
