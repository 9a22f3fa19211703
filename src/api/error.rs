//! Error taxonomy for backend calls
//!
//! Every client wrapper reports failures through [`ApiError`]. A 404 on the
//! preference lookup is not part of this taxonomy: it is the valid empty
//! state and is mapped to `None` before errors are raised.

use std::error::Error as StdError;
use std::fmt;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum ApiError {
    /// The server answered with a non-success status.
    Http {
        /// Status code of the failed response.
        status: StatusCode,
        /// Response body text, kept for diagnostics.
        body: String,
    },

    /// The request never completed (connect, TLS, or I/O failure), or the
    /// response body could not be decoded.
    Network(reqwest::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http { status, body } => {
                write!(f, "API request failed with status {status}: {body}")
            }
            ApiError::Network(source) => write!(f, "API request failed: {source}"),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ApiError::Http { .. } => None,
            ApiError::Network(source) => Some(source),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(source: reqwest::Error) -> Self {
        ApiError::Network(source)
    }
}

/// Turn a non-success response into [`ApiError::Http`], preserving the body.
pub(crate) async fn ok_or_api_error(
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ApiError::Http { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_includes_status_and_body() {
        let err = ApiError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("500"));
        assert!(rendered.contains("boom"));
    }
}
