//! Credential persistence.
//!
//! The client never holds tokens in its own fields. Everything lives in a
//! [`CredentialStore`], an injected key-value backend that survives process
//! restarts on real devices and is trivially faked in tests. The bundled
//! [`MemoryStore`] is both the default backend and the test fake.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::error::RequestError;

/// Store key holding the current access token.
pub const KEY_ACCESS_TOKEN: &str = "accessToken";
/// Store key holding the current refresh token.
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";
/// Store key holding the cached user snapshot, serialized as JSON.
pub const KEY_USER: &str = "user";

/// Error returned by a [`CredentialStore`] backend.
///
/// Persistent backends sit on real storage and may fail with disk or
/// permission errors; the message should describe what went wrong.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct StoreError(pub String);

/// A durable, asynchronous key-value backend for session state.
///
/// The store is the single source of truth for the current token pair: the
/// client reads it before every request and overwrites it on login,
/// registration and refresh. Implementations must fully overwrite a value
/// on `set` — partial updates are never issued.
///
/// # Example
/// ```rust,ignore
/// struct DiskStore { /* ... */ }
///
/// #[async_trait]
/// impl CredentialStore for DiskStore {
///     async fn get(&self, key: &str) -> Result<Option<String>, StoreError> { /* ... */ }
///     async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> { /* ... */ }
///     async fn remove(&self, key: &str) -> Result<(), StoreError> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Overwrite the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Delete the value stored under `key`. Removing a missing key is not
    /// an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// An in-memory [`CredentialStore`].
///
/// Sessions kept here die with the process. This is the default backend
/// when a client is built with [`crate::GymBuddy::new`], and the backend
/// tests inject to observe what the client persists.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// An access/refresh token pair, rotated together on every refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// The short-lived token attached as a bearer credential.
    pub access_token: String,
    /// The long-lived token exchanged for a new pair once the access token
    /// expires.
    pub refresh_token: String,
}

/// Snapshot of the signed-in user, kept beside the tokens so the UI can
/// greet the user without a network round trip.
///
/// Not authoritative; the server's user record may have moved on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedUser {
    /// The user's unique ID.
    pub id: String,
    /// The user's display name.
    pub username: String,
    /// The user's email address.
    pub email_address: String,
}

/// Typed view over the raw key-value store.
#[derive(Clone)]
pub(crate) struct Session {
    store: Arc<dyn CredentialStore>,
}

impl Session {
    pub(crate) fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub(crate) async fn access_token(&self) -> Result<Option<String>, RequestError> {
        Ok(self.store.get(KEY_ACCESS_TOKEN).await?)
    }

    pub(crate) async fn refresh_token(&self) -> Result<Option<String>, RequestError> {
        Ok(self.store.get(KEY_REFRESH_TOKEN).await?)
    }

    pub(crate) async fn save_pair(&self, pair: &TokenPair) -> Result<(), RequestError> {
        self.store.set(KEY_ACCESS_TOKEN, &pair.access_token).await?;
        self.store
            .set(KEY_REFRESH_TOKEN, &pair.refresh_token)
            .await?;
        Ok(())
    }

    pub(crate) async fn cached_user(&self) -> Result<Option<CachedUser>, RequestError> {
        let Some(raw) = self.store.get(KEY_USER).await? else {
            return Ok(None);
        };

        let user = serde_json::from_str::<CachedUser>(&raw)
            .map_err(|error| RequestError::Parse(error.to_string()))?;

        Ok(Some(user))
    }

    pub(crate) async fn save_user(&self, user: &CachedUser) -> Result<(), RequestError> {
        let raw =
            serde_json::to_string(user).map_err(|error| RequestError::Parse(error.to_string()))?;

        self.store.set(KEY_USER, &raw).await?;

        Ok(())
    }

    pub(crate) async fn clear(&self) -> Result<(), RequestError> {
        self.store.remove(KEY_ACCESS_TOKEN).await?;
        self.store.remove(KEY_REFRESH_TOKEN).await?;
        self.store.remove(KEY_USER).await?;
        Ok(())
    }
}
