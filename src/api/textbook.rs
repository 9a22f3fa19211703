use tracing::debug;

use crate::api::error::{ok_or_api_error, ApiError};
use crate::api::{Chapter, ChaptersResponse};
use crate::utils::url::construct_api_url;

/// Fetch the full chapter catalog for a textbook.
pub async fn fetch_chapters(
    client: &reqwest::Client,
    base_url: &str,
    textbook_id: &str,
) -> Result<Vec<Chapter>, ApiError> {
    let url = construct_api_url(base_url, &format!("api/v1/textbooks/{textbook_id}/chapters"));
    debug!(textbook_id, "fetching chapter catalog");

    let response = client.get(url).send().await?;
    let response = ok_or_api_error(response).await?;
    Ok(response.json::<ChaptersResponse>().await?.chapters)
}
