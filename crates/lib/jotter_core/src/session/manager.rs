// @awa-component: SES-SessionManager
//
//! Validity policy and background freshness checks.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::store::SessionStore;
use super::{SessionError, SessionPolicy};
use crate::auth::token::{is_expired, is_expiring_soon, time_until_expiry, token_preview};
use crate::models::session::{Identity, Role, Session};
use crate::notify::{EXPIRED_MESSAGE, expiring_soon_message};

/// Why an identity confirmation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The server refused the token (401, or 403 with an auth indicator).
    #[error("Authentication rejected (HTTP {0})")]
    AuthRejected(u16),

    /// Anything else: network failure, server error, unexpected body.
    #[error("Identity confirmation unavailable: {0}")]
    Transient(String),
}

/// Lightweight identity-confirmation call (`GET /user`).
#[async_trait]
pub trait IdentityProbe: Send + Sync {
    async fn confirm_identity(&self, token: &str) -> Result<(), ProbeError>;
}

/// Session store plus the validity policy.
///
/// Cheap to share behind an `Arc`; [`SessionManager::spawn_monitor`] needs
/// one.
pub struct SessionManager {
    store: Arc<SessionStore>,
    probe: Arc<dyn IdentityProbe>,
    policy: SessionPolicy,
}

impl SessionManager {
    pub fn new(store: Arc<SessionStore>, probe: Arc<dyn IdentityProbe>) -> Self {
        Self::with_policy(store, probe, SessionPolicy::default())
    }

    pub fn with_policy(
        store: Arc<SessionStore>,
        probe: Arc<dyn IdentityProbe>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            store,
            probe,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn snapshot(&self) -> Session {
        self.store.snapshot()
    }

    pub fn login(&self, identity: Identity, token: String, role: Role) -> Result<(), SessionError> {
        self.store.login(identity, token, role)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.logout()
    }

    pub fn switch_role(&self, role: Role) -> Result<(), SessionError> {
        self.store.switch_role(role)
    }

    /// Check the current token, locally first and then with the server.
    ///
    /// - no token: `false`, nothing happens
    /// - expired or unreadable token: session expired, no network call
    /// - server rejects the token: session expired
    /// - any other failure: session kept, `true`
    pub async fn validate(&self) -> bool {
        let seen = self.store.snapshot();
        let Some(token) = seen.token() else {
            return false;
        };

        if is_expired(token) {
            info!(token = %token_preview(token), "token expired locally");
            self.store.expire(EXPIRED_MESSAGE);
            return false;
        }

        match self.probe.confirm_identity(token).await {
            Ok(()) => {
                debug!("identity confirmed");
                self.store.confirm(&seen, true);
                true
            }
            Err(ProbeError::AuthRejected(status)) => {
                warn!(status, "server rejected token");
                self.store.expire(EXPIRED_MESSAGE);
                false
            }
            Err(ProbeError::Transient(reason)) => {
                warn!(%reason, "identity confirmation failed; keeping session");
                self.store.confirm(&seen, false);
                true
            }
        }
    }

    /// Publish `ExpiringSoon` if the token is inside the warning threshold.
    ///
    /// Returns the remaining milliseconds when a warning was published.
    pub fn check_expiry_warning(&self) -> Option<i64> {
        let token = self.store.token()?;
        if !is_expiring_soon(token.as_str(), self.policy.warning_threshold_ms) {
            return None;
        }

        let remaining = time_until_expiry(token.as_str());
        debug!(remaining_ms = remaining, "token expiring soon");
        self.store
            .dispatcher()
            .notify_expiring_soon(expiring_soon_message(remaining), remaining);
        Some(remaining)
    }

    /// Start the background checks.
    ///
    /// While a token is present, `validate` runs right away and then every
    /// validation interval, and the expiry warning is checked every warning
    /// interval. Both loops stop as soon as the token is gone and restart
    /// for the next one. Validations already in flight are never cancelled.
    pub fn spawn_monitor(self: &Arc<Self>) -> SessionMonitor {
        let cancel = CancellationToken::new();
        let manager = Arc::clone(self);
        let worker_cancel = cancel.clone();
        let handle = tokio::spawn(async move { manager.run_monitor(worker_cancel).await });
        SessionMonitor {
            cancel,
            handle: Some(handle),
        }
    }

    async fn run_monitor(self: Arc<Self>, cancel: CancellationToken) {
        let mut tokens = self.store.subscribe_token();
        loop {
            let present = tokens.borrow_and_update().is_some();
            let keep_going = if present {
                self.run_checks(&mut tokens, &cancel).await
            } else {
                tokio::select! {
                    _ = cancel.cancelled() => false,
                    changed = tokens.changed() => changed.is_ok(),
                }
            };
            if !keep_going || cancel.is_cancelled() {
                debug!("session monitor stopped");
                return;
            }
        }
    }

    /// Run both cadences until the token changes. Returns `false` on shutdown.
    async fn run_checks(
        self: &Arc<Self>,
        tokens: &mut watch::Receiver<Option<String>>,
        cancel: &CancellationToken,
    ) -> bool {
        self.spawn_validation();

        let start = Instant::now();
        let mut validation = time::interval_at(
            start + self.policy.validation_interval,
            self.policy.validation_interval,
        );
        validation.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut warning = time::interval_at(
            start + self.policy.warning_interval,
            self.policy.warning_interval,
        );
        warning.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return false,
                changed = tokens.changed() => return changed.is_ok(),
                _ = validation.tick() => self.spawn_validation(),
                _ = warning.tick() => {
                    self.check_expiry_warning();
                }
            }
        }
    }

    fn spawn_validation(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.validate().await;
        });
    }
}

/// Handle on the background checks. Dropping it stops them.
#[derive(Debug)]
pub struct SessionMonitor {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SessionMonitor {
    /// Stop scheduling new checks and wait for the loop to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "session monitor task failed");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
