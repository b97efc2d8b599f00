use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::{ApiRequest, GymBuddy};

/// A review one user left about training with another.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// The review's unique ID.
    pub id: String,
    /// The user who wrote the review.
    pub author_id: String,
    /// The user being reviewed.
    pub subject_id: String,
    /// Rating from 1 to 5.
    pub rating: u8,
    /// Optional free-form comment.
    pub comment: Option<String>,
    /// When the review was written.
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for writing a new review.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    /// The user being reviewed.
    pub subject_id: String,
    /// Rating from 1 to 5.
    pub rating: u8,
    /// Optional free-form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Partner review operations.
///
/// Created through [`GymBuddy::reviews`].
pub struct Reviews<'a> {
    pub(crate) client: &'a GymBuddy,
}

impl Reviews<'_> {
    /// Fetch all reviews written about a user.
    ///
    /// # Example
    /// ```rust,ignore
    /// let reviews = client.reviews().for_user("42").await?;
    ///
    /// for review in reviews {
    ///     println!("{}: {:?}", review.rating, review.comment);
    /// }
    /// ```
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<Review>, RequestError> {
        let request = ApiRequest::new(Method::GET, format!("/reviews/{user_id}"));

        self.client.execute(request).await
    }

    /// Write a review about a training partner.
    pub async fn create(&self, review: NewReview) -> Result<Review, RequestError> {
        let request = ApiRequest::new(Method::POST, "/reviews").json(&review)?;

        self.client.execute(request).await
    }
}
