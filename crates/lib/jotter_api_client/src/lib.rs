//! # jotter_api_client
//!
//! Typed HTTP client for the Jotter REST API.
//!
//! Every request goes through [`ApiClient`]'s interceptor, which attaches the
//! session's bearer token and expires the session when the server rejects
//! it. `ApiClient` also serves as the identity probe behind
//! [`jotter_core::session::manager::SessionManager::validate`].

mod admin;
mod auth;
mod client;
mod config;
mod error;
mod journal;
mod user;

#[cfg(test)]
mod test_support;

pub use auth::{Credentials, LoginResponse};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
