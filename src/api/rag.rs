//! Client wrapper for the RAG query and index endpoints
//!
//! One request, one response. Retry and timeout policy belong to the caller,
//! not this layer.

use tracing::{debug, warn};

use crate::api::error::{ok_or_api_error, ApiError};
use crate::api::{
    IndexAck, IndexRequest, IndexStatus, QueryRequest, QueryResponse, DEFAULT_EMBEDDING_MODEL,
};
use crate::utils::url::{construct_api_url, normalize_base_url};

pub struct RagClient {
    client: reqwest::Client,
    base_url: String,
}

impl RagClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Build a client around an existing `reqwest::Client`, so one connection
    /// pool can be shared across wrappers.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    /// Ask one question about a textbook's content.
    ///
    /// The canonical request body carries the textbook id and, when known,
    /// the user id alongside the query text.
    pub async fn query(
        &self,
        textbook_id: &str,
        query: &str,
        user_id: Option<&str>,
    ) -> Result<QueryResponse, ApiError> {
        let url = construct_api_url(
            &self.base_url,
            &format!("api/v1/textbook/{textbook_id}/query"),
        );
        debug!(textbook_id, "querying textbook content");

        let request = QueryRequest {
            query: query.to_string(),
            textbook_id: textbook_id.to_string(),
            user_id: user_id.map(str::to_string),
        };
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;
        let response = ok_or_api_error(response).await?;
        Ok(response.json::<QueryResponse>().await?)
    }

    /// Request construction of a RAG index for a textbook.
    pub async fn create_index(
        &self,
        textbook_id: &str,
        embedding_model: Option<&str>,
    ) -> Result<IndexAck, ApiError> {
        let url = construct_api_url(&self.base_url, "api/v1/rag-index");
        let request = IndexRequest {
            textbook_id: textbook_id.to_string(),
            embedding_model: embedding_model.unwrap_or(DEFAULT_EMBEDDING_MODEL).to_string(),
        };
        debug!(textbook_id, embedding_model = %request.embedding_model, "creating RAG index");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;
        let response = ok_or_api_error(response).await?;
        Ok(response.json::<IndexAck>().await?)
    }

    /// Report the status of a textbook's RAG index.
    ///
    /// The backend has no status endpoint yet, so this always answers with
    /// the `unknown` sentinel. Callers must not treat it as authoritative.
    pub async fn index_status(&self, textbook_id: &str) -> Result<IndexStatus, ApiError> {
        warn!(textbook_id, "index status endpoint not yet implemented on the backend");
        Ok(IndexStatus::unknown())
    }
}
