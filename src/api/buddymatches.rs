use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::{ApiRequest, GymBuddy};

/// Lifecycle state of a buddy request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Sent but not yet answered.
    Pending,
    /// Both sides agreed to train together.
    Accepted,
    /// The recipient turned the request down.
    Declined,
}

impl MatchStatus {
    pub(crate) const fn as_query(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

/// A buddy-match record linking two users.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuddyMatch {
    /// The match's unique ID.
    pub id: String,
    /// The user who sent the request.
    pub requester_id: String,
    /// The user the request was sent to.
    pub recipient_id: String,
    /// Where the request currently stands.
    pub status: MatchStatus,
    /// When the request was sent.
    pub created_at: Option<DateTime<Utc>>,
}

/// Buddy-match browsing and request operations.
///
/// Created through [`GymBuddy::buddy_matches`].
pub struct BuddyMatches<'a> {
    pub(crate) client: &'a GymBuddy,
}

pub struct BuddyMatchListBuilder<'a> {
    client: &'a GymBuddy,
    status: Option<MatchStatus>,
}

impl<'a> BuddyMatches<'a> {
    /// Fetch the signed-in user's matches, optionally filtered by status.
    ///
    /// # Example
    /// ```rust,ignore
    /// let accepted = client
    ///     .buddy_matches()
    ///     .list()
    ///     .status(MatchStatus::Accepted)
    ///     .call()
    ///     .await?;
    ///
    /// for buddy_match in accepted {
    ///     println!("{buddy_match:?}");
    /// }
    /// ```
    #[must_use]
    pub const fn list(self) -> BuddyMatchListBuilder<'a> {
        BuddyMatchListBuilder {
            client: self.client,
            status: None,
        }
    }

    /// Fetch the buddy requests waiting for the signed-in user's answer.
    pub async fn requests(&self) -> Result<Vec<BuddyMatch>, RequestError> {
        let request = ApiRequest::new(Method::GET, "/buddymatches/requests");

        self.client.execute(request).await
    }

    /// Send a buddy request to another user.
    pub async fn send_request(&self, user_id: &str) -> Result<(), RequestError> {
        let request = ApiRequest::new(Method::POST, format!("/buddymatches/{user_id}/request"));

        self.client.execute_unit(request).await
    }
}

impl BuddyMatchListBuilder<'_> {
    /// Only return matches in the given state.
    ///
    /// # Example
    /// ```rust,ignore
    /// .status(MatchStatus::Pending)
    /// ```
    #[must_use]
    pub const fn status(mut self, status: MatchStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Execute the request and return the matches.
    pub async fn call(self) -> Result<Vec<BuddyMatch>, RequestError> {
        let mut request = ApiRequest::new(Method::GET, "/buddymatches");

        if let Some(status) = self.status {
            request = request.query("status", status.as_query());
        }

        self.client.execute(request).await
    }
}
