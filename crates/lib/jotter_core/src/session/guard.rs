// @awa-component: SES-RouteGuard
//
//! Gatekeeping for protected views.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use super::store::SessionStore;
use crate::models::session::{Role, Session};
use crate::notify::{ExpirationEvent, ExpirationListener};

/// Top-level views the guard can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Admin,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Admin => "/admin",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where a freshly signed-in user lands for `role`.
pub fn landing_route(role: &Role) -> Route {
    if role.is_admin() {
        Route::Admin
    } else {
        Route::Dashboard
    }
}

/// What a protected view requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    /// Any signed-in session.
    #[default]
    Authenticated,
    /// A session currently acting as ADMIN.
    Admin,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session is still being confirmed; show a loading indicator.
    Loading,
    /// Render the protected content.
    Render,
    /// Send the user elsewhere.
    Redirect(Route),
}

pub struct RouteGuard;

impl RouteGuard {
    pub fn decide(session: &Session, access: Access) -> GuardDecision {
        if session.is_loading() {
            return GuardDecision::Loading;
        }
        if !session.is_authenticated() {
            return GuardDecision::Redirect(Route::Login);
        }
        if access == Access::Admin && !session.role().is_some_and(Role::is_admin) {
            return GuardDecision::Redirect(Route::Dashboard);
        }
        GuardDecision::Render
    }
}

/// Expiry listener held by a mounted guard.
///
/// On `Expired` it clears the session and yields [`Route::Login`]. Dropping
/// it unmounts the guard.
pub struct GuardListener {
    store: Arc<SessionStore>,
    listener: ExpirationListener,
}

impl GuardListener {
    pub fn mount(store: &Arc<SessionStore>) -> Self {
        Self {
            store: Arc::clone(store),
            listener: store.subscribe(),
        }
    }

    /// Wait for the next `Expired` event and handle it.
    pub async fn next_redirect(&mut self) -> Option<Route> {
        loop {
            match self.listener.recv().await? {
                ExpirationEvent::Expired { .. } => return Some(self.redirect()),
                ExpirationEvent::ExpiringSoon { .. } => continue,
            }
        }
    }

    /// Handle an already-published `Expired` event, if any.
    pub fn poll_redirect(&mut self) -> Option<Route> {
        while let Some(event) = self.listener.try_recv() {
            if matches!(event, ExpirationEvent::Expired { .. }) {
                return Some(self.redirect());
            }
        }
        None
    }

    fn redirect(&self) -> Route {
        info!("session expired; redirecting to login");
        self.store.handle_expiration();
        Route::Login
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::Identity;
    use crate::notify::EXPIRED_MESSAGE;
    use crate::test_support::{dual_role_identity, memory_store, token_expiring_in};

    #[test]
    fn loading_session_defers_decision() {
        let session = Session::validating(Identity::named("a"), "t".into(), Role::user());
        assert_eq!(
            RouteGuard::decide(&session, Access::Admin),
            GuardDecision::Loading
        );
    }

    #[test]
    fn signed_out_goes_to_login() {
        assert_eq!(
            RouteGuard::decide(&Session::empty(), Access::Authenticated),
            GuardDecision::Redirect(Route::Login)
        );
    }

    #[test]
    fn admin_views_need_admin_role() {
        let user = Session::authenticated(dual_role_identity(), "t".into(), Role::user());
        let admin = Session::authenticated(dual_role_identity(), "t".into(), Role::admin());

        assert_eq!(
            RouteGuard::decide(&user, Access::Authenticated),
            GuardDecision::Render
        );
        assert_eq!(
            RouteGuard::decide(&user, Access::Admin),
            GuardDecision::Redirect(Route::Dashboard)
        );
        assert_eq!(
            RouteGuard::decide(&admin, Access::Admin),
            GuardDecision::Render
        );
    }

    #[test]
    fn landing_route_by_role() {
        assert_eq!(landing_route(&Role::admin()), Route::Admin);
        assert_eq!(landing_route(&Role::user()), Route::Dashboard);
        assert_eq!(landing_route(&Role::new("GUEST")).path(), "/dashboard");
    }

    #[test]
    fn mounted_guard_redirects_on_expiry() {
        let (store, storage) = memory_store();
        let mut guard = GuardListener::mount(&store);
        store
            .login(Identity::named("alice"), token_expiring_in(600), Role::user())
            .unwrap();

        assert_eq!(guard.poll_redirect(), None);
        store.dispatcher().notify_expiring_soon("soon", 1_000);
        assert_eq!(guard.poll_redirect(), None);
        assert!(store.snapshot().is_authenticated());

        store.dispatcher().notify_expired(EXPIRED_MESSAGE);
        assert_eq!(guard.poll_redirect(), Some(Route::Login));
        assert_eq!(store.snapshot(), Session::empty());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn next_redirect_waits_for_expired() {
        let (store, _) = memory_store();
        let mut guard = GuardListener::mount(&store);
        store
            .login(Identity::named("alice"), token_expiring_in(600), Role::user())
            .unwrap();

        let expirer = Arc::clone(&store);
        tokio::spawn(async move {
            expirer.expire(EXPIRED_MESSAGE);
        });
        assert_eq!(guard.next_redirect().await, Some(Route::Login));
        assert!(!store.snapshot().is_authenticated());
    }
}
