use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::store::{CachedUser, TokenPair};
use crate::{ApiRequest, GymBuddy};

/// The payload returned by a successful login or registration.
///
/// Carries the freshly issued token pair alongside a snapshot of the user's
/// account. Both are persisted into the credential store before the call
/// returns.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// The short-lived bearer token for subsequent requests.
    pub access_token: String,
    /// The long-lived token used to obtain a new pair.
    pub refresh_token: String,
    /// The signed-in user's unique ID.
    pub id: String,
    /// The signed-in user's display name.
    pub username: String,
    /// The signed-in user's email address.
    pub email_address: String,
}

impl AuthSession {
    fn token_pair(&self) -> TokenPair {
        TokenPair {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }

    fn cached_user(&self) -> CachedUser {
        CachedUser {
            id: self.id.clone(),
            username: self.username.clone(),
            email_address: self.email_address.clone(),
        }
    }
}

/// Profile fields for a new account.
///
/// The client forwards these as-is; field validation is the server's job.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Display name, unique per account.
    pub username: String,
    /// Sign-in email address.
    pub email_address: String,
    /// Plain-text password, sent over TLS only.
    pub password: String,
    /// Free-form introduction shown on the profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Home city used for partner matching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Self-reported training experience, e.g. `"beginner"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    /// Training goals used for partner matching, e.g. `"strength"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_goals: Option<Vec<String>>,
}

#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload<'a> {
    email_address: &'a str,
    password: &'a str,
}

/// Authentication operations.
///
/// Created through [`GymBuddy::auth`].
pub struct Auth<'a> {
    pub(crate) client: &'a GymBuddy,
}

impl Auth<'_> {
    /// Sign in with an email address and password.
    ///
    /// On success the issued token pair and user snapshot are persisted
    /// into the credential store, so subsequent requests authenticate
    /// automatically.
    ///
    /// # Example
    /// ```rust,ignore
    /// let session = client
    ///     .auth()
    ///     .login("louise@example.com", "YOUR_PASSWORD")
    ///     .await?;
    ///
    /// println!("signed in as {}", session.username);
    /// ```
    pub async fn login(
        &self,
        email_address: &str,
        password: &str,
    ) -> Result<AuthSession, RequestError> {
        tracing::info!(email_address, "signing in");

        let request = ApiRequest::new(Method::POST, "/auth/login").json(&LoginPayload {
            email_address,
            password,
        })?;

        let session: AuthSession = self.client.execute_unauthenticated(request).await?;

        self.client.session.save_pair(&session.token_pair()).await?;
        self.client.session.save_user(&session.cached_user()).await?;

        Ok(session)
    }

    /// Create a new account.
    ///
    /// Like [`Auth::login`], a successful registration signs the user in:
    /// the returned token pair and user snapshot are persisted before the
    /// call returns.
    ///
    /// # Example
    /// ```rust,ignore
    /// let session = client
    ///     .auth()
    ///     .register(NewUser {
    ///         username: "lift_louise".to_string(),
    ///         email_address: "louise@example.com".to_string(),
    ///         password: "YOUR_PASSWORD".to_string(),
    ///         city: Some("Rotterdam".to_string()),
    ///         ..NewUser::default()
    ///     })
    ///     .await?;
    /// ```
    pub async fn register(&self, profile: NewUser) -> Result<AuthSession, RequestError> {
        tracing::info!(username = %profile.username, "registering new account");

        let request = ApiRequest::new(Method::POST, "/auth/register").json(&profile)?;

        let session: AuthSession = self.client.execute_unauthenticated(request).await?;

        self.client.session.save_pair(&session.token_pair()).await?;
        self.client.session.save_user(&session.cached_user()).await?;

        Ok(session)
    }

    /// Exchange the stored refresh token for a new token pair.
    ///
    /// Usually called on app start to confirm the persisted session is
    /// still valid; expired access tokens on regular calls are refreshed
    /// automatically without going through here.
    pub async fn refresh(&self) -> Result<(), RequestError> {
        let current = self.client.session.access_token().await?;

        self.client
            .refresh_session(current.as_deref())
            .await
            .map(|_| ())
    }

    /// Sign out and clear the persisted session.
    ///
    /// The server is notified on a best-effort basis when an access token
    /// exists; the local session is cleared regardless. Calling this
    /// without a session is a no-op, not an error.
    ///
    /// # Example
    /// ```rust,ignore
    /// client.auth().logout().await?;
    /// assert_eq!(client.token().await?, None);
    /// ```
    pub async fn logout(&self) -> Result<(), RequestError> {
        if let Some(token) = self.client.session.access_token().await? {
            let request = ApiRequest::new(Method::POST, "/auth/logout");

            if let Err(error) = self.client.send_once(&request, Some(&token)).await {
                tracing::warn!(%error, "server-side logout failed, clearing local session anyway");
            }
        }

        self.client.session.clear().await
    }
}
