//! Client wrapper for the user preference endpoints
//!
//! Preferences are keyed by (user, textbook) and replaced wholesale on every
//! save. Nothing is cached locally.

use reqwest::StatusCode;
use tracing::debug;

use crate::api::error::{ok_or_api_error, ApiError};
use crate::api::{Chapter, ChaptersResponse, PreferenceRecord};
use crate::utils::url::{construct_api_url, normalize_base_url};

pub struct PreferenceClient {
    client: reqwest::Client,
    base_url: String,
}

impl PreferenceClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    /// Fetch the saved chapter selection for one (user, textbook) pair.
    ///
    /// A 404 means "no preferences yet" and returns `Ok(None)`; it is never
    /// surfaced as an error.
    pub async fn get(
        &self,
        user_id: &str,
        textbook_id: &str,
    ) -> Result<Option<PreferenceRecord>, ApiError> {
        let url = construct_api_url(
            &self.base_url,
            &format!("api/v1/users/{user_id}/textbooks/{textbook_id}/preferences"),
        );
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(user_id, textbook_id, "no saved preferences");
            return Ok(None);
        }
        let response = ok_or_api_error(response).await?;
        Ok(Some(response.json::<PreferenceRecord>().await?))
    }

    /// Replace the saved chapter selection with `selected` (full replace, not
    /// incremental). The body is the plain id array.
    pub async fn set(
        &self,
        user_id: &str,
        textbook_id: &str,
        selected: &[i64],
    ) -> Result<PreferenceRecord, ApiError> {
        let url = construct_api_url(
            &self.base_url,
            &format!("api/v1/users/{user_id}/textbooks/{textbook_id}/preferences"),
        );
        debug!(user_id, textbook_id, count = selected.len(), "saving preferences");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&selected)
            .send()
            .await?;
        let response = ok_or_api_error(response).await?;
        Ok(response.json::<PreferenceRecord>().await?)
    }

    /// Fetch the chapter list filtered by the user's saved preferences. The
    /// backend falls back to the full catalog when nothing is saved.
    pub async fn filtered_chapters(
        &self,
        user_id: &str,
        textbook_id: &str,
    ) -> Result<Vec<Chapter>, ApiError> {
        let url = construct_api_url(
            &self.base_url,
            &format!("api/v1/users/{user_id}/textbooks/{textbook_id}/chapters"),
        );
        let response = self.client.get(url).send().await?;
        let response = ok_or_api_error(response).await?;
        Ok(response.json::<ChaptersResponse>().await?.chapters)
    }
}
