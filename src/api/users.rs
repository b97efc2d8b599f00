use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::{ApiRequest, GymBuddy};

/// A user's full profile record as returned by the server.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's unique ID.
    pub id: String,
    /// The user's display name.
    pub username: String,
    /// The user's email address.
    pub email_address: String,
    /// Free-form introduction shown on the profile.
    pub bio: Option<String>,
    /// Home city used for partner matching.
    pub city: Option<String>,
    /// Self-reported training experience, e.g. `"beginner"`.
    pub experience_level: Option<String>,
    /// Training goals used for partner matching.
    pub workout_goals: Option<Vec<String>>,
    /// Where the profile picture is served from, if one was uploaded.
    pub profile_picture_url: Option<String>,
    /// When the account was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the profile was last changed.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial profile update.
///
/// Only the fields set to `Some` are sent; the server leaves the rest
/// untouched.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New introduction text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// New home city.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// New experience level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    /// New training goals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_goals: Option<Vec<String>>,
}

/// User profile operations.
///
/// Created through [`GymBuddy::users`].
pub struct Users<'a> {
    pub(crate) client: &'a GymBuddy,
}

impl Users<'_> {
    /// Fetch a single user's profile.
    ///
    /// # Example
    /// ```rust,ignore
    /// let user = client.users().get("42").await?;
    /// println!("{} trains in {:?}", user.username, user.city);
    /// ```
    pub async fn get(&self, user_id: &str) -> Result<User, RequestError> {
        let request = ApiRequest::new(Method::GET, format!("/users/{user_id}"));

        self.client.execute(request).await
    }

    /// Fetch all browsable user profiles.
    pub async fn list(&self) -> Result<Vec<User>, RequestError> {
        let request = ApiRequest::new(Method::GET, "/users");

        self.client.execute(request).await
    }

    /// Update a user's profile and return the updated record.
    ///
    /// # Example
    /// ```rust,ignore
    /// let updated = client
    ///     .users()
    ///     .update("42", UserUpdate {
    ///         bio: Some("Evening lifter, looking for a spotter.".to_string()),
    ///         ..UserUpdate::default()
    ///     })
    ///     .await?;
    /// ```
    pub async fn update(&self, user_id: &str, changes: UserUpdate) -> Result<User, RequestError> {
        let request =
            ApiRequest::new(Method::PUT, format!("/users/{user_id}")).json(&changes)?;

        self.client.execute(request).await
    }

    /// Delete a user's account.
    pub async fn delete(&self, user_id: &str) -> Result<(), RequestError> {
        let request = ApiRequest::new(Method::DELETE, format!("/users/{user_id}"));

        self.client.execute_unit(request).await
    }
}
