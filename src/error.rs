//! Various errors module.

use thiserror::Error;

use crate::store::StoreError;

/// Represents errors when interacting with the GymBuddy API.
///
/// This enum provides a set of error types that may occur during
/// API requests, each indicating a specific issue encountered.
#[derive(Error, Debug)]
pub enum RequestError {
    /// Communication with the GymBuddy API failed at the transport level.
    ///
    /// This could be caused by an internet outage, an unreachable server,
    /// or the fixed request timeout elapsing. The client never retries
    /// these automatically.
    #[error("Network failure: the GymBuddy API could not be reached: {0}")]
    Network(String),
    /// Communication with the GymBuddy API was successful, but the server
    /// rejected the request and explained why.
    ///
    /// The message is the server's `msg` field, surfaced verbatim.
    #[error("{0}")]
    Api(String),
    /// The stored credentials could not be refreshed.
    ///
    /// Either no refresh token was available or the refresh exchange itself
    /// was rejected. The caller must send the user back through a full
    /// sign-in.
    #[error("Session expired: the stored credentials could not be refreshed. Sign in again.")]
    AuthExpired,
    /// A payload could not be converted into the expected data structure.
    ///
    /// For responses this usually means a mismatch between the expected
    /// record type and what the server actually returned.
    #[error("Parse Error: could not convert the payload into the expected data structure: {0}")]
    Parse(String),
    /// The credential store itself failed (disk or permission errors).
    #[error("Credential store failure: {0}")]
    Store(String),
}

impl From<StoreError> for RequestError {
    fn from(error: StoreError) -> Self {
        Self::Store(error.0)
    }
}
