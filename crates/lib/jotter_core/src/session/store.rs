// @awa-component: SES-SessionStore
//
//! Owned session state mirrored to storage.
//!
//! Every mutator takes the state lock, updates storage, and then updates the
//! in-memory session before releasing it, so storage always holds either all
//! three session keys or none of them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::SessionError;
use super::storage::{
    KeyValueStore, PersistedSession, ROLE_KEY, USER_KEY, clear_session, load_session,
    save_session,
};
use crate::auth::token::token_preview;
use crate::models::session::{Identity, Role, Session, SessionPhase};
use crate::notify::{ExpirationListener, NotificationDispatcher};

/// Sole owner of the client [`Session`].
///
/// Other components read [`SessionStore::snapshot`] and go through the
/// mutators below. Token changes are published on a watch channel so the
/// background checks can start and stop with the session.
pub struct SessionStore {
    state: Mutex<Session>,
    /// Token of the session last cleared by [`SessionStore::expire`]. Only
    /// that session may be reinstated by a late confirmation.
    expired_token: Mutex<Option<String>>,
    storage: Arc<dyn KeyValueStore>,
    dispatcher: NotificationDispatcher,
    token_tx: watch::Sender<Option<String>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("phase", &self.lock().phase())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Build the store and hydrate it from `storage`.
    ///
    /// A complete persisted session starts out `Validating`. Partial or
    /// unreadable storage is cleared and the session starts empty.
    pub fn open(storage: Arc<dyn KeyValueStore>, dispatcher: NotificationDispatcher) -> Self {
        let session = match load_session(storage.as_ref()) {
            Ok(Some(persisted)) => {
                debug!(
                    token = %token_preview(&persisted.token),
                    role = %persisted.role,
                    "restored persisted session"
                );
                Session::validating(persisted.identity, persisted.token, persisted.role)
            }
            Ok(None) => {
                if let Err(e) = clear_session(storage.as_ref()) {
                    warn!(error = %e, "failed to clear partial session storage");
                }
                Session::empty()
            }
            Err(e) => {
                warn!(error = %e, "failed to read session storage; starting signed out");
                if let Err(e) = clear_session(storage.as_ref()) {
                    warn!(error = %e, "failed to clear session storage");
                }
                Session::empty()
            }
        };

        let (token_tx, _) = watch::channel(session.token().map(str::to_string));
        Self {
            state: Mutex::new(session),
            expired_token: Mutex::new(None),
            storage,
            dispatcher,
            token_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_expired_token(&self, token: Option<&str>) {
        *self
            .expired_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = token.map(str::to_string);
    }

    fn expired_token_is(&self, token: &str) -> bool {
        self.expired_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_deref()
            == Some(token)
    }

    /// Bring storage back in line with `state` after a failed write.
    ///
    /// When the persisted triple no longer matches memory, both are cleared.
    fn reconcile(&self, state: &mut Session) {
        let expected = persisted(state);
        let diverged = match (load_session(self.storage.as_ref()), &expected) {
            (Ok(found), Some(_)) => found != expected,
            (Ok(_), None) => true,
            (Err(e), _) => {
                warn!(error = %e, "session storage unreadable after a failed write");
                true
            }
        };
        if !diverged {
            return;
        }

        if let Err(e) = clear_session(self.storage.as_ref()) {
            warn!(error = %e, "failed to clear session storage");
        }
        if expected.is_some() {
            warn!("session storage diverged after a failed write; signing out");
            *state = Session::empty();
            self.publish_token(None);
        }
    }

    fn publish_token(&self, token: Option<&str>) {
        self.token_tx.send_if_modified(|current| {
            if current.as_deref() == token {
                false
            } else {
                *current = token.map(str::to_string);
                true
            }
        });
    }

    /// Read-only copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.lock().token().map(str::to_string)
    }

    /// Install a session from a successful credential exchange.
    ///
    /// The session is `Authenticated` immediately. If the storage write
    /// fails the previous session is kept, or, when storage cannot be put
    /// back, cleared from both memory and storage.
    pub fn login(&self, identity: Identity, token: String, role: Role) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::MissingToken);
        }

        let persisted = PersistedSession {
            token,
            identity,
            role,
        };

        let mut state = self.lock();
        if let Err(e) = save_session(self.storage.as_ref(), &persisted) {
            self.reconcile(&mut state);
            return Err(e.into());
        }
        self.set_expired_token(None);
        info!(
            username = %persisted.identity.username,
            role = %persisted.role,
            token = %token_preview(&persisted.token),
            "signed in"
        );
        *state = Session::authenticated(persisted.identity, persisted.token, persisted.role);
        self.publish_token(state.token());
        Ok(())
    }

    /// Same as [`SessionStore::login`]; a fresh signup is a login.
    pub fn signup(&self, identity: Identity, token: String, role: Role) -> Result<(), SessionError> {
        self.login(identity, token, role)
    }

    /// Clear the session and storage. Idempotent.
    ///
    /// Memory is always cleared; a storage failure is returned afterwards.
    pub fn logout(&self) -> Result<(), SessionError> {
        let mut state = self.lock();
        let was_signed_in = state.is_authenticated();
        *state = Session::empty();
        self.set_expired_token(None);
        let cleared = clear_session(self.storage.as_ref());
        self.publish_token(None);
        drop(state);

        if was_signed_in {
            info!("signed out");
        }
        cleared.map_err(|e| {
            warn!(error = %e, "failed to clear session storage");
            SessionError::from(e)
        })
    }

    /// Act as `role`, which the identity must allow.
    pub fn switch_role(&self, role: Role) -> Result<(), SessionError> {
        let mut state = self.lock();
        let identity = state.identity().ok_or(SessionError::NotAuthenticated)?;
        if state.token().is_none() {
            return Err(SessionError::NotAuthenticated);
        }
        if !identity.allows(&role) {
            debug!(%role, username = %identity.username, "role switch refused");
            return Err(SessionError::RoleNotPermitted(role));
        }

        self.storage.set(ROLE_KEY, role.as_str())?;
        info!(%role, "switched role");
        state.set_role(role);
        Ok(())
    }

    /// Replace the identity, keeping token and role.
    pub fn refresh_identity(&self, identity: Identity) -> Result<(), SessionError> {
        let mut state = self.lock();
        if state.token().is_none() {
            return Err(SessionError::NotAuthenticated);
        }

        let user = serde_json::to_string(&identity).map_err(super::storage::StorageError::from)?;
        self.storage.set(USER_KEY, &user)?;
        debug!(username = %identity.username, "refreshed identity");
        state.set_identity(identity);
        Ok(())
    }

    /// Clear the session and publish one `Expired` event.
    ///
    /// Returns `false`, without notifying, when there was no session to
    /// clear. Concurrent callers therefore produce a single notification.
    pub fn expire(&self, message: &str) -> bool {
        let mut state = self.lock();
        let Some(token) = state.token() else {
            return false;
        };
        info!(token = %token_preview(token), "session expired");
        self.set_expired_token(Some(token));

        *state = Session::empty();
        if let Err(e) = clear_session(self.storage.as_ref()) {
            warn!(error = %e, "failed to clear session storage");
        }
        self.publish_token(None);
        drop(state);

        self.dispatcher.notify_expired(message);
        true
    }

    /// Clear the session after the user acknowledged an expiry.
    pub fn handle_expiration(&self) {
        if let Err(e) = self.logout() {
            warn!(error = %e, "session cleared but storage could not be emptied");
        }
    }

    /// Record a confirmation result for the session captured in `seen`.
    ///
    /// If the session still carries the same token it becomes
    /// `Authenticated`. If another check expired that same token in the
    /// meantime and `restore` is set, `seen` is reinstated (the late response
    /// wins). A logout, or a session holding a different token, is final.
    pub(crate) fn confirm(&self, seen: &Session, restore: bool) -> SessionPhase {
        let Some(seen_token) = seen.token() else {
            return self.lock().phase();
        };

        let mut state = self.lock();
        match state.token() {
            Some(current) if current == seen_token => {
                state.set_phase(SessionPhase::Authenticated);
            }
            None if restore && self.expired_token_is(seen_token) => {
                let (Some(identity), Some(role)) = (seen.identity(), seen.role()) else {
                    return state.phase();
                };
                let persisted = PersistedSession {
                    token: seen_token.to_string(),
                    identity: identity.clone(),
                    role: role.clone(),
                };
                if let Err(e) = save_session(self.storage.as_ref(), &persisted) {
                    warn!(error = %e, "failed to persist restored session");
                    self.reconcile(&mut state);
                    return state.phase();
                }
                self.set_expired_token(None);
                warn!(
                    token = %token_preview(seen_token),
                    "late confirmation restored a cleared session"
                );
                *state =
                    Session::authenticated(persisted.identity, persisted.token, persisted.role);
                self.publish_token(state.token());
            }
            _ => {}
        }
        state.phase()
    }

    /// Watch the bearer token. The value changes on login, logout and expiry.
    pub fn subscribe_token(&self) -> watch::Receiver<Option<String>> {
        self.token_tx.subscribe()
    }

    /// Dispatcher that carries this session's expiry notifications.
    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Shorthand for `dispatcher().subscribe()`.
    pub fn subscribe(&self) -> ExpirationListener {
        self.dispatcher.subscribe()
    }
}

fn persisted(session: &Session) -> Option<PersistedSession> {
    match (session.token(), session.identity(), session.role()) {
        (Some(token), Some(identity), Some(role)) => Some(PersistedSession {
            token: token.to_string(),
            identity: identity.clone(),
            role: role.clone(),
        }),
        _ => None,
    }
}
