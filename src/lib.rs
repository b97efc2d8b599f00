//! `gymbuddy-rs` is a typed Rust client for the GymBuddy fitness-partner
//! matching API.
//!
//! Every response from the GymBuddy backend is wrapped in a
//! `{ success, data, msg }` envelope; this crate unwraps the envelope, keeps
//! the signed-in session alive by transparently refreshing an expired access
//! token (at most once per call), and persists the token pair in a pluggable
//! [`CredentialStore`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::error::Error;
//!
//! use gymbuddy_rs::{GymBuddy, MatchStatus, RequestError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn Error>> {
//!     let client = GymBuddy::new("https://api.gymbuddy.example");
//!
//!     client
//!         .auth()
//!         .login("YOUR_EMAIL", "YOUR_PASSWORD")
//!         .await?;
//!
//!     let partners = client
//!         .buddy_matches()
//!         .list()
//!         .status(MatchStatus::Accepted)
//!         .call()
//!         .await?;
//!
//!     for partner in partners {
//!         println!("matched with user {}", partner.recipient_id);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use api::auth::{Auth, AuthSession, NewUser};
pub use api::buddymatches::{BuddyMatch, BuddyMatches, MatchStatus};
pub use api::images::Images;
pub use api::reviews::{NewReview, Review, Reviews};
pub use api::users::{User, UserUpdate, Users};
pub use error::RequestError;
pub use store::{
    CachedUser, CredentialStore, MemoryStore, StoreError, TokenPair, KEY_ACCESS_TOKEN,
    KEY_REFRESH_TOKEN, KEY_USER,
};

use store::Session;

pub(crate) mod api;
pub mod error;
pub mod store;

/// Fixed timeout applied to every request.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_millis(2000);

/// The wire-level wrapper every GymBuddy response shares.
///
/// When `success` is true, `data` holds the sole payload surfaced to
/// callers; when false, `msg` explains the failure and `data` is undefined.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) success: bool,
    pub(crate) data: Option<T>,
    pub(crate) msg: Option<String>,
}

/// A fully read response: status line plus body text.
///
/// Reading the body eagerly lets the refresh cycle inspect the status and
/// still hand the payload to the envelope parser afterwards.
pub(crate) struct RawReply {
    pub(crate) status: reqwest::StatusCode,
    pub(crate) body: String,
}

/// Description of one outbound call.
///
/// Held only for the duration of a single refresh-and-retry cycle so the
/// retry can rebuild the request with a fresh bearer token. Multipart
/// bodies are described rather than pre-built for the same reason.
pub(crate) struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(&'static str, String)>,
    pub(crate) body: RequestBody,
}

pub(crate) enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(UploadForm),
}

/// Rebuildable description of a single-file multipart form.
pub(crate) struct UploadForm {
    pub(crate) field: String,
    pub(crate) bytes: Vec<u8>,
    pub(crate) file_name: String,
    pub(crate) mime: String,
}

impl UploadForm {
    fn to_form(&self) -> Result<reqwest::multipart::Form, RequestError> {
        let part = reqwest::multipart::Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime)
            .map_err(|error| RequestError::Parse(format!("invalid mime type: {error}")))?;

        Ok(reqwest::multipart::Form::new().part(self.field.clone(), part))
    }
}

impl ApiRequest {
    pub(crate) fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: vec![],
            body: RequestBody::Empty,
        }
    }

    pub(crate) fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub(crate) fn json<T: Serialize>(mut self, body: &T) -> Result<Self, RequestError> {
        let value =
            serde_json::to_value(body).map_err(|error| RequestError::Parse(error.to_string()))?;

        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub(crate) fn multipart(mut self, form: UploadForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshPayload<'a> {
    refresh_token: &'a str,
}

/// A GymBuddy client for sending requests to a GymBuddy backend.
///
/// The client owns no token state of its own: the injected
/// [`CredentialStore`] is the single source of truth for the current token
/// pair, and every outbound call reads it fresh. The `Debug` implementation
/// redacts the store to prevent accidental credential exposure in logs.
///
/// # Example
/// ```rust,ignore
/// use std::error::Error;
///
/// use gymbuddy_rs::GymBuddy;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn Error>> {
///     let client = GymBuddy::new("https://api.gymbuddy.example");
///
///     client.auth().login("YOUR_EMAIL", "YOUR_PASSWORD").await?;
///
///     let me = client.users().get("me").await?;
///     println!("signed in as {}", me.username);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct GymBuddy {
    pub(crate) base_url: String,
    pub(crate) http: reqwest::Client,
    pub(crate) session: Session,
    refresh_gate: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for GymBuddy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GymBuddy")
            .field("base_url", &self.base_url)
            .field("session", &"***REDACTED***")
            .field("http", &"Client")
            .finish()
    }
}

impl GymBuddy {
    /// Creates a new GymBuddy client backed by an in-memory credential
    /// store.
    ///
    /// Sessions established through this client die with the process; pass
    /// a durable store to [`GymBuddy::with_store`] to survive restarts.
    ///
    /// # Example
    /// ```rust
    /// use gymbuddy_rs::GymBuddy;
    ///
    /// let client = GymBuddy::new("http://localhost:3000");
    /// assert_eq!(client.base_url(), "http://localhost:3000".to_string());
    /// ```
    ///
    /// # Panics
    ///
    /// This method will panic if the provided `base_url` is not a valid URL.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_store(base_url, Arc::new(store::MemoryStore::new()))
    }

    /// Creates a new GymBuddy client with the given credential store.
    ///
    /// The store is the single source of truth for the token pair; pass the
    /// same store to every client that should share a session.
    ///
    /// # Example
    /// ```rust,ignore
    /// use std::sync::Arc;
    ///
    /// use gymbuddy_rs::{GymBuddy, MemoryStore};
    ///
    /// let store = Arc::new(MemoryStore::new());
    /// let client = GymBuddy::with_store("http://localhost:3000", store);
    /// ```
    ///
    /// # Panics
    ///
    /// This method will panic if the provided `base_url` is not a valid URL.
    #[must_use]
    pub fn with_store(base_url: &str, credential_store: Arc<dyn CredentialStore>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self::new_with_client(base_url, credential_store, client)
    }

    /// Creates a new GymBuddy client with a custom reqwest client.
    ///
    /// # Example
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use gymbuddy_rs::{GymBuddy, MemoryStore};
    ///
    /// let reqwest_client = reqwest::Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .expect("Failed to build client");
    ///
    /// let client = GymBuddy::new_with_client(
    ///     "http://localhost:3000",
    ///     Arc::new(MemoryStore::new()),
    ///     reqwest_client,
    /// );
    /// ```
    ///
    /// # Panics
    ///
    /// This method will panic if the provided `base_url` is not a valid URL.
    #[must_use]
    pub fn new_with_client(
        base_url: &str,
        credential_store: Arc<dyn CredentialStore>,
        client: reqwest::Client,
    ) -> Self {
        // Validate URL format
        let trimmed_url = base_url.trim_end_matches('/');
        assert!(
            trimmed_url.starts_with("http://") || trimmed_url.starts_with("https://"),
            "Invalid base_url: must start with http:// or https://"
        );

        Self {
            base_url: trimmed_url.to_string(),
            http: client,
            session: Session::new(credential_store),
            refresh_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Returns the base URL of the GymBuddy server.
    ///
    /// # Example
    /// ```rust,ignore
    /// let client = GymBuddy::new("http://localhost:3000");
    /// assert_eq!(client.base_url(), "http://localhost:3000".to_string());
    /// ```
    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    /// Retrieves the current access token from the credential store, if
    /// available.
    ///
    /// # Example
    /// ```rust,ignore
    /// if let Some(token) = client.token().await? {
    ///     println!("Authenticated with token: {token}");
    /// } else {
    ///     println!("Not authenticated");
    /// }
    /// ```
    pub async fn token(&self) -> Result<Option<String>, RequestError> {
        self.session.access_token().await
    }

    /// Retrieves the cached user snapshot, if a user is signed in.
    ///
    /// The snapshot is written on login and registration and is not kept in
    /// sync with the server; fetch the full record through
    /// [`Users::get`] when freshness matters.
    pub async fn cached_user(&self) -> Result<Option<CachedUser>, RequestError> {
        self.session.cached_user().await
    }

    /// Access authentication operations: login, register, refresh, logout.
    #[must_use]
    pub const fn auth(&self) -> Auth<'_> {
        Auth { client: self }
    }

    /// Access user profile operations.
    #[must_use]
    pub const fn users(&self) -> Users<'_> {
        Users { client: self }
    }

    /// Access buddy-match browsing and request operations.
    #[must_use]
    pub const fn buddy_matches(&self) -> BuddyMatches<'_> {
        BuddyMatches { client: self }
    }

    /// Access partner review operations.
    #[must_use]
    pub const fn reviews(&self) -> Reviews<'_> {
        Reviews { client: self }
    }

    /// Access image upload operations.
    #[must_use]
    pub const fn images(&self) -> Images<'_> {
        Images { client: self }
    }
}

impl GymBuddy {
    /// Performs an authenticated call and unwraps the envelope's `data`.
    ///
    /// A 401 on the first attempt triggers one refresh cycle followed by
    /// exactly one retry with the rotated token.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, RequestError> {
        let reply = self.send_with_refresh(&request).await?;
        unwrap_envelope(&reply)
    }

    /// Like [`GymBuddy::execute`], for operations whose success carries no
    /// payload.
    pub(crate) async fn execute_unit(&self, request: ApiRequest) -> Result<(), RequestError> {
        let reply = self.send_with_refresh(&request).await?;
        unwrap_envelope_unit(&reply)
    }

    /// Performs a call with no bearer credential and no refresh cycle.
    ///
    /// Login, registration and the refresh exchange itself go through here.
    pub(crate) async fn execute_unauthenticated<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, RequestError> {
        let reply = self.send_once(&request, None).await?;
        unwrap_envelope(&reply)
    }

    async fn send_with_refresh(&self, request: &ApiRequest) -> Result<RawReply, RequestError> {
        let token = self.session.access_token().await?;

        let reply = self.send_once(request, token.as_deref()).await?;
        if reply.status != reqwest::StatusCode::UNAUTHORIZED {
            return Ok(reply);
        }

        tracing::debug!(path = %request.path, "access token rejected, starting refresh cycle");

        let fresh = self.refresh_session(token.as_deref()).await?;

        let reply = self.send_once(request, Some(&fresh)).await?;
        if reply.status == reqwest::StatusCode::UNAUTHORIZED {
            // At most one refresh per logical call. A rejection of the
            // rotated token is terminal.
            return Err(RequestError::AuthExpired);
        }

        Ok(reply)
    }

    /// Exchanges the stored refresh token for a new pair and persists it.
    ///
    /// `stale` is the access token the failing call was dispatched with.
    /// Concurrent callers serialize behind the refresh gate; whoever enters
    /// second finds the stored token already rotated and skips the network
    /// exchange.
    pub(crate) async fn refresh_session(
        &self,
        stale: Option<&str>,
    ) -> Result<String, RequestError> {
        let _guard = self.refresh_gate.lock().await;

        if let Some(current) = self.session.access_token().await? {
            if stale != Some(current.as_str()) {
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.session.refresh_token().await? else {
            return Err(RequestError::AuthExpired);
        };

        tracing::debug!("exchanging refresh token for a new token pair");

        let request = ApiRequest::new(Method::POST, "/auth/refresh").json(&RefreshPayload {
            refresh_token: &refresh_token,
        })?;

        // Any failure of the exchange ends the session. The stored pair is
        // only ever replaced by a successful rotation or an explicit logout.
        let pair = match self.send_once(&request, None).await {
            Ok(reply) if reply.status != reqwest::StatusCode::UNAUTHORIZED => {
                unwrap_envelope::<TokenPair>(&reply).map_err(|_| RequestError::AuthExpired)?
            }
            _ => return Err(RequestError::AuthExpired),
        };

        self.session.save_pair(&pair).await?;

        tracing::debug!("token pair rotated");

        Ok(pair.access_token)
    }

    /// Builds and dispatches one request, reading the full response body.
    ///
    /// No retries happen at this level.
    pub(crate) async fn send_once(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<RawReply, RequestError> {
        let url = format!("{}{}", self.base_url, request.path);

        tracing::trace!(method = %request.method, %url, "dispatching request");

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header("Accept", "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(form.to_form()?),
        };

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|error| {
            if error.is_timeout() {
                RequestError::Network("request timed out".to_string())
            } else if error.is_connect() {
                RequestError::Network("failed to connect to server".to_string())
            } else {
                RequestError::Network(error.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| RequestError::Network(error.to_string()))?;

        Ok(RawReply { status, body })
    }
}

fn parse_envelope<T: DeserializeOwned>(reply: &RawReply) -> Result<Envelope<T>, RequestError> {
    serde_json::from_str(&reply.body).map_err(|error| {
        if reply.status.is_success() {
            RequestError::Parse(error.to_string())
        } else {
            RequestError::Api(format!("request failed with status {}", reply.status))
        }
    })
}

fn unwrap_envelope<T: DeserializeOwned>(reply: &RawReply) -> Result<T, RequestError> {
    let envelope = parse_envelope::<T>(reply)?;

    if envelope.success {
        envelope.data.ok_or_else(|| {
            RequestError::Parse("server reported success without a payload".to_string())
        })
    } else {
        Err(RequestError::Api(envelope.msg.unwrap_or_else(|| {
            format!("request failed with status {}", reply.status)
        })))
    }
}

fn unwrap_envelope_unit(reply: &RawReply) -> Result<(), RequestError> {
    let envelope = parse_envelope::<serde_json::Value>(reply)?;

    if envelope.success {
        Ok(())
    } else {
        Err(RequestError::Api(envelope.msg.unwrap_or_else(|| {
            format!("request failed with status {}", reply.status)
        })))
    }
}
