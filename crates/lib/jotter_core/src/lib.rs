//! # jotter_core
//!
//! Core domain logic for Jotter: bearer-token inspection, the session
//! lifecycle, expiry notifications, route guarding, and journal statistics.

pub mod auth;
pub mod models;
pub mod notify;
pub mod session;
pub mod stats;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;
