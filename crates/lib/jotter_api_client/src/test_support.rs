//! Shared fixtures for client tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jotter_core::models::session::{Identity, Role};
use jotter_core::notify::NotificationDispatcher;
use jotter_core::session::storage::MemoryStore;
use jotter_core::session::store::SessionStore;
use jsonwebtoken::{EncodingKey, Header, encode};
use wiremock::MockServer;

use crate::{ApiClient, ClientConfig};

/// Signed token for `alice` expiring `secs` from now (negative for the past).
pub fn token_expiring_in(secs: i64) -> String {
    let exp = (Utc::now() + Duration::seconds(secs)).timestamp();
    encode(
        &Header::default(),
        &serde_json::json!({ "sub": "alice", "exp": exp }),
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("encode test token")
}

/// Empty session backed by memory.
pub fn memory_session() -> (Arc<SessionStore>, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    let store = SessionStore::open(storage.clone(), NotificationDispatcher::new());
    (Arc::new(store), storage)
}

/// Signed-out client pointed at `server`.
pub fn client_for(server: &MockServer) -> ApiClient {
    let (store, _) = memory_session();
    ApiClient::new(&ClientConfig::new(server.uri()), store).expect("client")
}

/// Client pointed at `server` with `alice` signed in as USER.
pub async fn signed_in_client(
    server: &MockServer,
) -> (ApiClient, Arc<SessionStore>, Arc<MemoryStore>) {
    let (store, storage) = memory_session();
    store
        .login(
            Identity::named("alice"),
            token_expiring_in(3_600),
            Role::user(),
        )
        .expect("login");
    let client = ApiClient::new(&ClientConfig::new(server.uri()), Arc::clone(&store)).expect("client");
    (client, store, storage)
}
