//! Helpers shared by unit tests across the crate.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;

use crate::models::session::{Identity, Role};
use crate::notify::NotificationDispatcher;
use crate::session::storage::{KeyValueStore, MemoryStore, StorageError};
use crate::session::store::SessionStore;

/// Sign arbitrary claims with a throwaway HS256 key.
pub fn token_with_claims(claims: serde_json::Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("encode test token")
}

/// Token for user `alice` expiring at `exp` (unix seconds).
pub fn token_with_exp(exp: i64) -> String {
    token_with_claims(json!({
        "sub": "alice",
        "exp": exp,
        "iat": exp - 900,
    }))
}

/// Token expiring `secs` seconds from the real clock.
pub fn token_expiring_in(secs: i64) -> String {
    token_with_exp((Utc::now() + Duration::seconds(secs)).timestamp())
}

/// Identity allowed to act as either USER or ADMIN.
pub fn dual_role_identity() -> Identity {
    Identity {
        username: "alice".into(),
        email: Some("alice@example.com".into()),
        sentiment_analysis: true,
        roles: vec![Role::user(), Role::admin()],
    }
}

/// Fresh store backed by memory, plus a handle on the backing storage.
pub fn memory_store() -> (Arc<SessionStore>, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    let store = SessionStore::open(storage.clone(), NotificationDispatcher::new());
    (Arc::new(store), storage)
}

/// Memory storage whose writes can be made to fail.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_key: Mutex<Option<&'static str>>,
    set_budget: Mutex<Option<usize>>,
}

impl FailingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every later `set` of `key` fails.
    pub fn fail_on(&self, key: &'static str) {
        *self.fail_key.lock().unwrap() = Some(key);
    }

    /// Allow `n` more successful `set` calls, then fail all of them.
    pub fn fail_after(&self, n: usize) {
        *self.set_budget.lock().unwrap() = Some(n);
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let disk_full = || StorageError::Io(std::io::Error::other("disk full"));
        if *self.fail_key.lock().unwrap() == Some(key) {
            return Err(disk_full());
        }
        if let Some(budget) = self.set_budget.lock().unwrap().as_mut() {
            if *budget == 0 {
                return Err(disk_full());
            }
            *budget -= 1;
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

/// Session store over a [`FailingStore`].
pub fn failing_store() -> (Arc<SessionStore>, Arc<FailingStore>) {
    let storage = FailingStore::new();
    let store = SessionStore::open(storage.clone(), NotificationDispatcher::new());
    (Arc::new(store), storage)
}
