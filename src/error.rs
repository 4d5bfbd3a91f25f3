use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContentError {
    #[error("Could not find post {0}")]
    NotFound(String),

    #[error("Error fetching content: {0}")]
    Fetch(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Pagination cursor must not be empty")]
    InvalidCursor,

    #[error("Template error: {0}")]
    Template(String),
}

impl From<reqwest::Error> for ContentError {
    /// The request URL is dropped, it may carry the access token.
    fn from(value: reqwest::Error) -> Self {
        ContentError::Fetch(value.without_url().to_string())
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(value: serde_json::Error) -> Self {
        ContentError::Fetch(format!("Invalid response body: {}", value))
    }
}
