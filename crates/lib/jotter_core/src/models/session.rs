//! Session domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Role tag attached to a session (e.g. `USER`, `ADMIN`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub const USER: &'static str = "USER";
    pub const ADMIN: &'static str = "ADMIN";

    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn user() -> Self {
        Self::new(Self::USER)
    }

    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        Self::new(role)
    }
}

/// Identity descriptor of the signed-in account.
///
/// Persisted as JSON under the `user` storage key and refreshed from
/// `GET /user`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentiment_analysis: bool,
    /// Roles this account may act as. Empty when the server did not say.
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<Role>,
}

impl Identity {
    /// Identity known only by its username (credential login, OAuth).
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Whether this account may act as `role`.
    pub fn allows(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No token.
    #[default]
    Unauthenticated,
    /// Token present, freshness not yet confirmed.
    Validating,
    /// Token present and confirmed (or trusted from a fresh login).
    Authenticated,
}

/// Snapshot of the client session.
///
/// The constructors keep the invariant that a session without a token has
/// neither identity nor role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    identity: Option<Identity>,
    role: Option<Role>,
    phase: SessionPhase,
}

impl Session {
    /// Logged-out session.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Session trusted without a confirmation round trip.
    pub fn authenticated(identity: Identity, token: String, role: Role) -> Self {
        Self {
            token: Some(token),
            identity: Some(identity),
            role: Some(role),
            phase: SessionPhase::Authenticated,
        }
    }

    /// Session restored from storage, awaiting confirmation.
    pub fn validating(identity: Identity, token: String, role: Role) -> Self {
        Self {
            phase: SessionPhase::Validating,
            ..Self::authenticated(identity, token, role)
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether a guard should hold off deciding.
    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Validating
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn set_role(&mut self, role: Role) {
        if self.token.is_some() {
            self.role = Some(role);
        }
    }

    pub(crate) fn set_identity(&mut self, identity: Identity) {
        if self.token.is_some() {
            self.identity = Some(identity);
        }
    }

    pub(crate) fn set_phase(&mut self, phase: SessionPhase) {
        if self.token.is_some() {
            self.phase = phase;
        }
    }
}
