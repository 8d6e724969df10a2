//! Credential exchange (`/public/login`, `/public/signup`) and OAuth sign-in.

use jotter_core::auth::oauth::OAuthCallback;
use jotter_core::models::session::{Identity, Role};
use jotter_core::validation::validate_credentials;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};

/// Body of the credential endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Response of `POST /public/login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl LoginResponse {
    /// Granted role; `USER` when the server did not say.
    pub fn role(&self) -> Role {
        self.role.clone().unwrap_or_else(Role::user)
    }
}

impl ApiClient {
    /// `POST /public/login`. Does not touch the session.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        let builder = self.request(Method::POST, "/public/login")?.json(credentials);
        self.send_json(builder).await
    }

    /// `POST /public/signup`. The response body is not used.
    pub async fn signup(&self, credentials: &Credentials) -> ApiResult<()> {
        let builder = self.request(Method::POST, "/public/signup")?.json(credentials);
        self.send_empty(builder).await
    }

    /// Exchange credentials and install the session. Returns the granted role.
    pub async fn sign_in(&self, credentials: &Credentials) -> ApiResult<Role> {
        validate_credentials(&credentials.username, &credentials.password)?;
        let response = self.login(credentials).await?;
        if response.access_token.is_empty() {
            return Err(ApiError::Decode("login response has no access_token".into()));
        }

        let role = response.role();
        self.session().login(
            Identity::named(credentials.username.trim()),
            response.access_token,
            role.clone(),
        )?;
        info!(username = %credentials.username.trim(), %role, "login succeeded");
        Ok(role)
    }

    /// Register an account. Leaves the session signed out.
    pub async fn sign_up(&self, credentials: &Credentials) -> ApiResult<()> {
        validate_credentials(&credentials.username, &credentials.password)?;
        self.signup(credentials).await?;
        info!(username = %credentials.username.trim(), "signup succeeded");
        Ok(())
    }

    /// Install the session carried by an OAuth redirect.
    pub fn sign_in_with_callback(&self, callback: OAuthCallback) -> ApiResult<Role> {
        let role = callback.role.clone();
        let identity = callback.identity();
        self.session().login(identity, callback.token, role.clone())?;
        info!(%role, "OAuth login succeeded");
        Ok(role)
    }
}
