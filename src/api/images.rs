use reqwest::Method;

use crate::api::users::User;
use crate::error::RequestError;
use crate::{ApiRequest, GymBuddy, UploadForm};

/// Image upload operations.
///
/// Created through [`GymBuddy::images`].
pub struct Images<'a> {
    pub(crate) client: &'a GymBuddy,
}

impl Images<'_> {
    /// Upload a new profile picture and return the updated user record.
    ///
    /// The image is sent as a multipart form. Should the access token have
    /// expired, the form is rebuilt from the given bytes for the retry.
    ///
    /// # Example
    /// ```rust,ignore
    /// use std::fs;
    ///
    /// let image = fs::read("./deadlift_day.jpg")?;
    ///
    /// let user = client
    ///     .images()
    ///     .upload_profile_picture("42", image, "deadlift_day.jpg", "image/jpeg")
    ///     .await?;
    ///
    /// println!("picture now at {:?}", user.profile_picture_url);
    /// ```
    pub async fn upload_profile_picture(
        &self,
        user_id: &str,
        bytes: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> Result<User, RequestError> {
        let request = ApiRequest::new(
            Method::POST,
            format!("/auth/upload-profile-picture/{user_id}"),
        )
        .multipart(UploadForm {
            field: "profilePicture".to_string(),
            bytes,
            file_name: file_name.to_string(),
            mime: mime.to_string(),
        });

        self.client.execute(request).await
    }
}
