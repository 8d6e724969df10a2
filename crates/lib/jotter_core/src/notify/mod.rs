// @awa-component: SES-NotificationDispatcher
//
//! Expiry notifications.
//!
//! A typed publish/subscribe channel between the session and whatever shows
//! expiry banners. Delivery is fire-and-forget: a listener only sees events
//! published while it is subscribed, and nothing is replayed.

pub mod banner;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, warn};

/// Default broadcast channel capacity.
const DEFAULT_CAPACITY: usize = 64;

/// Message carried by every `Expired` event.
pub const EXPIRED_MESSAGE: &str = "Your session has expired. Please login again.";

/// A point-in-time expiry notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpirationEvent {
    /// The session was cleared because its token is no longer valid.
    Expired { message: String },
    /// The token expires in `remaining_ms` milliseconds.
    ExpiringSoon { message: String, remaining_ms: i64 },
}

impl ExpirationEvent {
    pub fn message(&self) -> &str {
        match self {
            Self::Expired { message } | Self::ExpiringSoon { message, .. } => message,
        }
    }
}

/// Warning text for a token with `remaining_ms` left.
pub fn expiring_soon_message(remaining_ms: i64) -> String {
    let minutes = (remaining_ms.max(0) + 59_999) / 60_000;
    let plural = if minutes == 1 { "" } else { "s" };
    format!("Your session will expire in {minutes} minute{plural}. Please save your work.")
}

/// Broadcast channel for [`ExpirationEvent`]s.
///
/// Cloning yields another handle on the same channel.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    tx: broadcast::Sender<ExpirationEvent>,
}

impl NotificationDispatcher {
    /// Create a dispatcher with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a dispatcher with a custom channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Broadcast `Expired`. Returns the number of listeners reached.
    pub fn notify_expired(&self, message: impl Into<String>) -> usize {
        self.publish(ExpirationEvent::Expired {
            message: message.into(),
        })
    }

    /// Broadcast `ExpiringSoon`. Repeated calls re-notify.
    pub fn notify_expiring_soon(&self, message: impl Into<String>, remaining_ms: i64) -> usize {
        self.publish(ExpirationEvent::ExpiringSoon {
            message: message.into(),
            remaining_ms,
        })
    }

    /// Attach a listener. It receives events published from now on.
    pub fn subscribe(&self) -> ExpirationListener {
        ExpirationListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn publish(&self, event: ExpirationEvent) -> usize {
        debug!(?event, "publishing expiration event");
        // No listeners is not an error; the event is simply dropped.
        self.tx.send(event).unwrap_or(0)
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of a [`NotificationDispatcher`]. Dropping it detaches.
#[derive(Debug)]
pub struct ExpirationListener {
    rx: broadcast::Receiver<ExpirationEvent>,
}

impl ExpirationListener {
    /// Wait for the next event. `None` once the dispatcher is gone.
    pub async fn recv(&mut self) -> Option<ExpirationEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "expiration listener lagged; skipping missed events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-published event, without waiting.
    pub fn try_recv(&mut self) -> Option<ExpirationEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_rounds_minutes_up() {
        assert_eq!(
            expiring_soon_message(240_000),
            "Your session will expire in 4 minutes. Please save your work."
        );
        assert_eq!(
            expiring_soon_message(45_000),
            "Your session will expire in 1 minute. Please save your work."
        );
        assert_eq!(
            expiring_soon_message(60_001),
            "Your session will expire in 2 minutes. Please save your work."
        );
    }

    #[test]
    fn publishing_without_listeners_is_a_no_op() {
        let dispatcher = NotificationDispatcher::new();
        assert_eq!(dispatcher.notify_expired(EXPIRED_MESSAGE), 0);
    }

    #[test]
    fn every_listener_sees_each_event_once() {
        let dispatcher = NotificationDispatcher::new();
        let mut a = dispatcher.subscribe();
        let mut b = dispatcher.subscribe();

        assert_eq!(dispatcher.notify_expired(EXPIRED_MESSAGE), 2);

        let expected = ExpirationEvent::Expired {
            message: EXPIRED_MESSAGE.into(),
        };
        assert_eq!(a.try_recv(), Some(expected.clone()));
        assert_eq!(b.try_recv(), Some(expected));
        assert_eq!(a.try_recv(), None);
    }

    #[test]
    fn late_listener_misses_earlier_events() {
        let dispatcher = NotificationDispatcher::new();
        dispatcher.notify_expiring_soon("soon", 120_000);
        let mut late = dispatcher.subscribe();
        assert_eq!(late.try_recv(), None);
    }

    #[test]
    fn repeated_warnings_are_not_deduplicated() {
        let dispatcher = NotificationDispatcher::new();
        let mut listener = dispatcher.subscribe();
        dispatcher.notify_expiring_soon("soon", 120_000);
        dispatcher.notify_expiring_soon("soon", 120_000);
        assert!(listener.try_recv().is_some());
        assert!(listener.try_recv().is_some());
    }

    #[test]
    fn dropping_listener_detaches_it() {
        let dispatcher = NotificationDispatcher::new();
        let listener = dispatcher.subscribe();
        assert_eq!(dispatcher.listener_count(), 1);
        drop(listener);
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[tokio::test]
    async fn recv_waits_for_next_event() {
        let dispatcher = NotificationDispatcher::new();
        let mut listener = dispatcher.subscribe();
        let publisher = dispatcher.clone();
        tokio::spawn(async move {
            publisher.notify_expiring_soon("soon", 90_000);
        });
        let event = listener.recv().await.unwrap();
        assert!(matches!(
            event,
            ExpirationEvent::ExpiringSoon {
                remaining_ms: 90_000,
                ..
            }
        ));
    }
}
