//! Lockitron integration
//!
//! - `client`: REST calls against the Lockitron v2 API
//! - `entity`: the lock entity holding the last observed state
//! - `setup`: builds the configured lock and registers it with the host
//! - `poller`: periodic refresh of registered locks

mod client;
mod entity;
mod poller;
mod setup;

pub use self::client::LockitronClient;
pub use self::entity::{LockEntity, LockitronLock};
pub use self::poller::{LockPoller, SharedLock};
pub use self::setup::setup_platform;
