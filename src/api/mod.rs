use serde::{Deserialize, Serialize};

pub mod error;
pub mod preferences;
pub mod rag;
pub mod textbook;

pub use error::ApiError;

/// Embedding model used when index creation does not name one.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chapter {
    pub id: i64,
    pub chapter_number: i64,
    pub title: String,
}

#[derive(Deserialize)]
pub struct ChaptersResponse {
    pub chapters: Vec<Chapter>,
}

#[derive(Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub textbook_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceRef {
    pub chapter_title: String,
    pub page_reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
    pub confidence: Option<f64>,
}

/// A user's persisted chapter selection for one textbook.
///
/// The backend stores the selection as a JSON-encoded string inside the JSON
/// response body, so the field has to be decoded a second time client-side.
#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceRecord {
    #[serde(default)]
    pub selected_chapters: Option<String>,
}

impl PreferenceRecord {
    /// Decode the double-encoded chapter id array.
    ///
    /// A missing or empty field means "no preferences yet" and decodes to the
    /// empty selection rather than an error.
    pub fn selected_ids(&self) -> Result<Vec<i64>, serde_json::Error> {
        match self.selected_chapters.as_deref() {
            None | Some("") => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(raw),
        }
    }
}

#[derive(Serialize)]
pub struct IndexRequest {
    pub textbook_id: String,
    pub embedding_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexAck {
    pub id: String,
    pub textbook_id: String,
    pub status: String,
    pub embedding_model: String,
}

/// Sentinel status reported while the backend lacks a status endpoint.
pub const INDEX_STATUS_UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Deserialize)]
pub struct IndexStatus {
    pub status: String,
}

impl IndexStatus {
    pub fn unknown() -> Self {
        Self {
            status: INDEX_STATUS_UNKNOWN.to_string(),
        }
    }

    pub fn is_authoritative(&self) -> bool {
        self.status != INDEX_STATUS_UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_record_decodes_double_encoded_ids() {
        let record: PreferenceRecord =
            serde_json::from_str(r#"{"selected_chapters": "[2, 5]"}"#).unwrap();
        assert_eq!(record.selected_ids().unwrap(), vec![2, 5]);
    }

    #[test]
    fn missing_or_empty_selection_decodes_to_empty() {
        let missing: PreferenceRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.selected_ids().unwrap(), Vec::<i64>::new());

        let empty: PreferenceRecord =
            serde_json::from_str(r#"{"selected_chapters": ""}"#).unwrap();
        assert_eq!(empty.selected_ids().unwrap(), Vec::<i64>::new());

        let null: PreferenceRecord =
            serde_json::from_str(r#"{"selected_chapters": null}"#).unwrap();
        assert_eq!(null.selected_ids().unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn malformed_inner_payload_is_an_error() {
        let record: PreferenceRecord =
            serde_json::from_str(r#"{"selected_chapters": "not json"}"#).unwrap();
        assert!(record.selected_ids().is_err());
    }

    #[test]
    fn query_response_defaults_sources_and_keeps_confidence_absent() {
        let response: QueryResponse =
            serde_json::from_str(r#"{"response": "ROS2 is..."}"#).unwrap();
        assert_eq!(response.response, "ROS2 is...");
        assert!(response.sources.is_empty());
        assert!(response.confidence.is_none());
    }

    #[test]
    fn query_response_distinguishes_zero_confidence_from_absent() {
        let zero: QueryResponse =
            serde_json::from_str(r#"{"response": "x", "confidence": 0.0}"#).unwrap();
        assert_eq!(zero.confidence, Some(0.0));
    }

    #[test]
    fn query_request_omits_absent_user_id() {
        let request = QueryRequest {
            query: "what is ROS2?".to_string(),
            textbook_id: "tb-1".to_string(),
            user_id: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("user_id").is_none());
        assert_eq!(body["textbook_id"], "tb-1");
    }

    #[test]
    fn index_status_sentinel_is_not_authoritative() {
        assert!(!IndexStatus::unknown().is_authoritative());
        let ready = IndexStatus {
            status: "ready".to_string(),
        };
        assert!(ready.is_authoritative());
    }
}
