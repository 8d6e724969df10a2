//! Authentication helpers that run entirely on the client.
//!
//! Provides unverified bearer-token inspection and OAuth redirect handling.
//! Nothing in here talks to the network.

pub mod oauth;
pub mod token;

use thiserror::Error;

/// Failure to interpret a bearer token.
///
/// Every variant is treated as "already expired" by callers; it is never
/// shown to the user as a distinct error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Token is absent")]
    Absent,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid token claims: {0}")]
    InvalidClaims(String),

    #[error("Token has no usable expiry claim")]
    MissingExpiry,
}

/// Failure reported by an OAuth redirect callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    #[error("Authentication failed. Please try again.")]
    Provider(String),

    #[error("Authentication failed. Missing token or role.")]
    MissingParameters,
}
