// @awa-component: API-ApiClient
//
//! HTTP client core and the session interceptor.
//!
//! All endpoint methods build their request with [`ApiClient::request`] and
//! send it with [`ApiClient::send`], so the bearer token is attached and
//! rejected tokens expire the session in exactly one place.

use std::sync::Arc;

use async_trait::async_trait;
use jotter_core::auth::token::token_preview;
use jotter_core::notify::EXPIRED_MESSAGE;
use jotter_core::session::manager::{IdentityProbe, ProbeError};
use jotter_core::session::store::SessionStore;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, extract_message, json_message};

/// Substrings of a 403 `message` that mark the token itself as rejected.
const TOKEN_REJECTION_MARKERS: [&str; 3] = ["JWT", "token", "expired"];

/// Client for the Jotter REST API, bound to one session.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> ApiResult<Self> {
        let base = Url::parse(&config.base_url)?;
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    /// Start a request carrying the session's current token, if any.
    pub(crate) fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let token = self.session.token();
        self.request_with_token(method, path, token.as_deref())
    }

    fn request_with_token(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        let builder = self.http.request(method.clone(), url);
        Ok(match token {
            Some(token) => {
                debug!(%method, path, token = %token_preview(token), "sending request with token");
                builder.bearer_auth(token)
            }
            None => {
                debug!(%method, path, "sending request without token");
                builder
            }
        })
    }

    /// Send a request and inspect the response.
    ///
    /// A 401, or a 403 whose `message` blames the token, expires the session
    /// and yields [`ApiError::Unauthorized`]. Other failures are returned
    /// with the server's message and leave the session alone.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = extract_message(code, &body);

        let token_rejected = match status {
            StatusCode::UNAUTHORIZED => true,
            StatusCode::FORBIDDEN => is_token_rejection(&body),
            _ => false,
        };

        if token_rejected {
            warn!(status = code, %message, "server rejected session token");
            self.session.expire(EXPIRED_MESSAGE);
            return Err(ApiError::Unauthorized {
                status: code,
                message,
            });
        }

        debug!(status = code, %message, "request failed");
        Err(ApiError::Status {
            status: code,
            message,
        })
    }

    /// Send and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send and decode a JSON body that may be empty.
    pub(crate) async fn send_optional_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> ApiResult<Option<T>> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send and discard the body.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> ApiResult<()> {
        self.send(builder).await?;
        Ok(())
    }
}

fn is_token_rejection(body: &str) -> bool {
    json_message(body).is_some_and(|message| {
        TOKEN_REJECTION_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    })
}

#[async_trait]
impl IdentityProbe for ApiClient {
    /// `GET /user` with `token`. Any 401 or 403 counts as a rejection.
    async fn confirm_identity(&self, token: &str) -> Result<(), ProbeError> {
        let builder = self
            .request_with_token(Method::GET, "/user", Some(token))
            .map_err(|e| ProbeError::Transient(e.to_string()))?;

        match self.send(builder).await {
            Ok(_) => Ok(()),
            Err(ApiError::Unauthorized { status, .. }) => Err(ProbeError::AuthRejected(status)),
            Err(ApiError::Status { status: 403, .. }) => Err(ProbeError::AuthRejected(403)),
            Err(e) => Err(ProbeError::Transient(e.to_string())),
        }
    }
}
