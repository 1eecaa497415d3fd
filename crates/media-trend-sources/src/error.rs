use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// Connection, timeout or body decoding failure
    #[error("request failed: {0}")]
    Transport(String),

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The host answered but refused the request
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        // Query strings carry the API key, keep them out of logs
        SourceError::Transport(e.without_url().to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Parse(e.to_string())
    }
}
