//! Client session lifecycle.
//!
//! [`store::SessionStore`] owns the session and mirrors it to storage.
//! [`manager::SessionManager`] adds the validity policy and the background
//! checks. [`guard`] decides what a protected view may render.

pub mod guard;
pub mod manager;
pub mod storage;
pub mod store;


use std::time::Duration;

use thiserror::Error;

use crate::auth::token::DEFAULT_WARNING_THRESHOLD_MS;
use crate::models::session::Role;
use storage::StorageError;

/// Default cadence of background validation: 1 minute.
pub const DEFAULT_VALIDATION_INTERVAL: Duration = Duration::from_secs(60);

/// Default cadence of the expiring-soon check: 30 seconds.
pub const DEFAULT_WARNING_INTERVAL: Duration = Duration::from_secs(30);

/// Errors returned by session mutators.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("A token is required to sign in")]
    MissingToken,

    #[error("Role {0} is not permitted for this account")]
    RoleNotPermitted(Role),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Timing policy for the background checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// How often the token is re-confirmed with the API.
    pub validation_interval: Duration,
    /// How often the expiring-soon check runs.
    pub warning_interval: Duration,
    /// Remaining lifetime below which a warning is published.
    pub warning_threshold_ms: i64,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            validation_interval: DEFAULT_VALIDATION_INTERVAL,
            warning_interval: DEFAULT_WARNING_INTERVAL,
            warning_threshold_ms: DEFAULT_WARNING_THRESHOLD_MS,
        }
    }
}
