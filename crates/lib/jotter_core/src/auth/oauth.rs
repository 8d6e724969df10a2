//! Google OAuth redirect handling.
//!
//! The API performs the code exchange itself and redirects back to the
//! client with the outcome in the query string (`token`, `role`, `error`).

use url::Url;

use super::CallbackError;
use crate::models::session::{Identity, Role};

/// Google's consent endpoint.
pub const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Display name given to accounts created through the OAuth flow.
pub const OAUTH_USERNAME: &str = "Google User";

/// Successful OAuth redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCallback {
    pub token: String,
    pub role: Role,
}

impl OAuthCallback {
    /// Identity to log in with; the callback carries no profile data.
    pub fn identity(&self) -> Identity {
        Identity::named(OAUTH_USERNAME)
    }
}

/// Parse the redirect target. Accepts a full URL, `?query`, or a bare query.
pub fn parse_oauth_callback(input: &str) -> Result<OAuthCallback, CallbackError> {
    let query = match input.split_once('?') {
        Some((_, q)) => q,
        None => input,
    };
    let query = query.split('#').next().unwrap_or_default();

    let mut token = None;
    let mut role = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match &*key {
            "error" => return Err(CallbackError::Provider(value.into_owned())),
            "token" if !value.is_empty() => token = Some(value.into_owned()),
            "role" if !value.is_empty() => role = Some(Role::new(value.into_owned())),
            _ => {}
        }
    }

    match (token, role) {
        (Some(token), Some(role)) => Ok(OAuthCallback { token, role }),
        _ => Err(CallbackError::MissingParameters),
    }
}

/// Build the Google consent URL that starts the OAuth flow.
pub fn google_authorization_url(client_id: &str, redirect_uri: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        GOOGLE_AUTH_ENDPOINT,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", "openid email profile"),
            ("prompt", "consent"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_and_role_from_full_url() {
        let cb = parse_oauth_callback("http://localhost:3000/auth/callback?token=abc.def.ghi&role=ADMIN")
            .unwrap();
        assert_eq!(cb.token, "abc.def.ghi");
        assert_eq!(cb.role, Role::admin());
        assert_eq!(cb.identity().username, "Google User");
    }

    #[test]
    fn parses_bare_query() {
        let cb = parse_oauth_callback("role=USER&token=t1").unwrap();
        assert_eq!(cb.token, "t1");
        assert_eq!(cb.role, Role::user());
    }

    #[test]
    fn error_parameter_wins() {
        let err = parse_oauth_callback("?token=t1&role=USER&error=access_denied").unwrap_err();
        assert_eq!(err, CallbackError::Provider("access_denied".into()));
        assert_eq!(err.to_string(), "Authentication failed. Please try again.");
    }

    #[test]
    fn missing_role_is_rejected() {
        assert_eq!(
            parse_oauth_callback("?token=t1"),
            Err(CallbackError::MissingParameters)
        );
        assert_eq!(
            parse_oauth_callback("?token=&role=USER"),
            Err(CallbackError::MissingParameters)
        );
    }

    #[test]
    fn authorization_url_carries_required_parameters() {
        let url = google_authorization_url("client-1", "http://localhost:3000/auth/callback").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("client_id".into(), "client-1".into())));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("scope".into(), "openid email profile".into())));
        assert!(pairs.contains(&("prompt".into(), "consent".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://localhost:3000/auth/callback".into()
        )));
    }
}
