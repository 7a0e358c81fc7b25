//! Data models for the Lockitron bridge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Lock State Models
// ============================================================================

/// Lock state as reported by the Lockitron API.
///
/// The API speaks in verbs (`"lock"` / `"unlock"`); any other value the
/// service reports is kept as `Unknown` rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockState {
    #[serde(rename = "lock")]
    Locked,
    #[serde(rename = "unlock")]
    Unlocked,
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl LockState {
    /// Value sent as the `state` query parameter of a change request
    pub fn as_api_str(&self) -> &'static str {
        match self {
            LockState::Locked => "lock",
            LockState::Unlocked => "unlock",
            LockState::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockState::Locked => write!(f, "locked"),
            LockState::Unlocked => write!(f, "unlocked"),
            LockState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Body of `GET /v2/locks/{id}` and `PUT /v2/locks/{id}`
#[derive(Debug, Deserialize)]
pub struct LockStateResponse {
    pub state: LockState,
}

// ============================================================================
// API Response Models
// ============================================================================

/// Lock status exposed by the control API. Never carries the access token.
#[derive(Debug, Clone, Serialize)]
pub struct LockStatus {
    pub name: String,
    pub device_id: String,
    pub state: LockState,
    pub is_locked: bool,
    /// False while the last call to the Lockitron API failed
    pub available: bool,
    pub last_updated: DateTime<Utc>,
}
