//! Passive expiry banners.
//!
//! Banners only display what the dispatcher tells them and forward the
//! user's "log out" choice to the session store. Each banner holds its own
//! listener, so it only sees events published while it exists.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::{ExpirationEvent, ExpirationListener};
use crate::auth::token::DEFAULT_WARNING_THRESHOLD_MS;
use crate::session::store::SessionStore;

/// How long the expired banner stays up before closing itself.
pub const EXPIRED_BANNER_AUTO_HIDE: Duration = Duration::from_secs(10);

// =============================================================================
// Expired banner
// =============================================================================

/// Shown once the session has been cleared.
///
/// Closing it, by hand or by timeout, clears the session for good.
pub struct ExpiredBanner {
    store: Arc<SessionStore>,
    listener: ExpirationListener,
    open: Option<(String, Instant)>,
}

impl ExpiredBanner {
    pub fn mount(store: &Arc<SessionStore>) -> Self {
        Self {
            store: Arc::clone(store),
            listener: store.subscribe(),
            open: None,
        }
    }

    /// Apply pending events without waiting. Returns whether the banner is open.
    pub fn observe(&mut self) -> bool {
        while let Some(event) = self.listener.try_recv() {
            self.apply(event);
        }
        self.is_open()
    }

    /// Wait until the banner opens. `false` once the dispatcher is gone.
    pub async fn wait_open(&mut self) -> bool {
        while let Some(event) = self.listener.recv().await {
            if self.apply(event) {
                return true;
            }
        }
        false
    }

    fn apply(&mut self, event: ExpirationEvent) -> bool {
        match event {
            ExpirationEvent::Expired { message } => {
                self.open = Some((message, Instant::now()));
                true
            }
            ExpirationEvent::ExpiringSoon { .. } => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.open.as_ref().map(|(message, _)| message.as_str())
    }

    /// Close the banner once it has been up for [`EXPIRED_BANNER_AUTO_HIDE`].
    pub fn tick(&mut self) -> bool {
        let due = self
            .open
            .as_ref()
            .is_some_and(|(_, opened)| opened.elapsed() >= EXPIRED_BANNER_AUTO_HIDE);
        if due {
            self.close();
        }
        self.is_open()
    }

    pub fn close(&mut self) {
        if self.open.take().is_some() {
            self.store.handle_expiration();
        }
    }

    /// "Login again" action; same as closing.
    pub fn login_again(&mut self) {
        self.close();
    }
}

// =============================================================================
// Expiry warning banner
// =============================================================================

#[derive(Debug, Clone)]
struct Warning {
    message: String,
    remaining_ms: i64,
    received: Instant,
}

/// Dismissible countdown shown while the token is about to expire.
pub struct ExpiryWarningBanner {
    store: Arc<SessionStore>,
    listener: ExpirationListener,
    warning: Option<Warning>,
}

impl ExpiryWarningBanner {
    pub fn mount(store: &Arc<SessionStore>) -> Self {
        Self {
            store: Arc::clone(store),
            listener: store.subscribe(),
            warning: None,
        }
    }

    /// Apply pending events without waiting. Returns whether the banner is open.
    pub fn observe(&mut self) -> bool {
        while let Some(event) = self.listener.try_recv() {
            self.apply(event);
        }
        self.is_open()
    }

    /// Wait until a warning arrives. `false` once the dispatcher is gone.
    pub async fn wait_open(&mut self) -> bool {
        while let Some(event) = self.listener.recv().await {
            if self.apply(event) {
                return true;
            }
        }
        false
    }

    fn apply(&mut self, event: ExpirationEvent) -> bool {
        match event {
            ExpirationEvent::ExpiringSoon {
                message,
                remaining_ms,
            } => {
                self.warning = Some(Warning {
                    message,
                    remaining_ms,
                    received: Instant::now(),
                });
                true
            }
            ExpirationEvent::Expired { .. } => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.warning.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.warning.as_ref().map(|w| w.message.as_str())
    }

    /// Live countdown: the announced time minus what has elapsed since.
    pub fn remaining_ms(&self) -> Option<i64> {
        self.warning.as_ref().map(|w| {
            let elapsed = i64::try_from(w.received.elapsed().as_millis()).unwrap_or(i64::MAX);
            w.remaining_ms.saturating_sub(elapsed)
        })
    }

    /// Share of the warning window left, in percent.
    pub fn progress(&self) -> Option<f64> {
        self.remaining_ms().map(progress_percent)
    }

    /// Close without side effects.
    pub fn dismiss(&mut self) {
        self.warning = None;
    }

    /// Close and clear the session.
    pub fn logout_now(&mut self) {
        self.warning = None;
        self.store.handle_expiration();
    }
}

/// `remaining` as a percentage of the 5 minute warning window, clamped.
pub fn progress_percent(remaining_ms: i64) -> f64 {
    if remaining_ms <= 0 {
        return 0.0;
    }
    (remaining_ms as f64 / DEFAULT_WARNING_THRESHOLD_MS as f64 * 100.0).clamp(0.0, 100.0)
}

/// `m:ss` countdown text.
pub fn format_countdown(remaining_ms: i64) -> String {
    let secs = remaining_ms.max(0) / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
