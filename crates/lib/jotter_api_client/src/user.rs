//! Profile endpoints under `/user`.

use jotter_core::models::journal::{DailyQuote, PasswordChange, ProfileUpdate};
use jotter_core::models::session::Identity;
use jotter_core::session::SessionError;
use jotter_core::validation::{validate_password_change, validate_profile};
use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiResult;

impl ApiClient {
    /// `GET /user`.
    pub async fn current_user(&self) -> ApiResult<Identity> {
        let builder = self.request(Method::GET, "/user")?;
        self.send_json(builder).await
    }

    /// `GET /user` and store the result as the session identity.
    pub async fn refresh_identity(&self) -> ApiResult<Identity> {
        let identity = self.current_user().await?;
        self.session().refresh_identity(identity.clone())?;
        Ok(identity)
    }

    /// `PUT /user`, then refresh the session identity.
    ///
    /// Uses the server's copy of the profile when it sends one, otherwise
    /// the submitted fields merged into the current identity.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Identity> {
        validate_profile(&update.username)?;
        let update = ProfileUpdate {
            username: update.username.trim().to_string(),
            email: update.email.trim().to_string(),
            sentiment_analysis: update.sentiment_analysis,
        };

        let builder = self.request(Method::PUT, "/user")?.json(&update);
        let returned: Option<Identity> = self.send_optional_json(builder).await?;

        let identity = match returned {
            Some(identity) => identity,
            None => {
                let mut identity = self
                    .session()
                    .snapshot()
                    .identity()
                    .cloned()
                    .ok_or(SessionError::NotAuthenticated)?;
                identity.email = Some(update.email).filter(|e| !e.is_empty());
                identity.sentiment_analysis = update.sentiment_analysis;
                identity
            }
        };
        self.session().refresh_identity(identity.clone())?;
        Ok(identity)
    }

    /// `PUT /user/password`.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> ApiResult<()> {
        validate_password_change(current_password, new_password)?;
        let body = PasswordChange {
            current_password: current_password.to_string(),
            password: new_password.to_string(),
        };
        let builder = self.request(Method::PUT, "/user/password")?.json(&body);
        self.send_empty(builder).await
    }

    /// `GET /user/daily-quote`.
    pub async fn daily_quote(&self) -> ApiResult<DailyQuote> {
        let builder = self.request(Method::GET, "/user/daily-quote")?;
        self.send_json(builder).await
    }
}
