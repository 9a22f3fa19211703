//! URL utilities for consistent endpoint construction
//!
//! The backend base URL arrives from flags, the environment, or the config
//! file, so trailing slashes have to be normalized before paths are appended.

/// Normalize a base URL by removing trailing slashes.
///
/// # Examples
///
/// ```
/// use ragbook::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete endpoint URL from a base URL and a path.
///
/// Both sides are stripped of their adjoining slashes so the result never
/// contains a double slash.
///
/// # Examples
///
/// ```
/// use ragbook::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000/", "/api/v1/rag-index"),
///     "http://localhost:8000/api/v1/rag-index"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://localhost:8000"),
            "http://localhost:8000"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8000/"),
            "http://localhost:8000"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8000///"),
            "http://localhost:8000"
        );
        assert_eq!(normalize_base_url(""), "");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn test_construct_api_url() {
        assert_eq!(
            construct_api_url("http://localhost:8000", "api/v1/rag-index"),
            "http://localhost:8000/api/v1/rag-index"
        );
        assert_eq!(
            construct_api_url("http://localhost:8000/", "api/v1/rag-index"),
            "http://localhost:8000/api/v1/rag-index"
        );
        assert_eq!(
            construct_api_url("http://localhost:8000", "/api/v1/rag-index"),
            "http://localhost:8000/api/v1/rag-index"
        );
        assert_eq!(
            construct_api_url("http://localhost:8000///", "//api/v1/rag-index"),
            "http://localhost:8000/api/v1/rag-index"
        );
    }
}
