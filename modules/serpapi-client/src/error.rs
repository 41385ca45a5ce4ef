use thiserror::Error;

pub type Result<T> = std::result::Result<T, SerpError>;

#[derive(Debug, Error)]
pub enum SerpError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Parse error: {0}")]
    Parse(String),
}

impl SerpError {
    /// Transient failures are safe to retry once on this idempotent GET;
    /// API rejections and malformed bodies are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, SerpError::Network(_) | SerpError::Timeout)
    }
}

impl From<reqwest::Error> for SerpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SerpError::Timeout
        } else if err.is_decode() {
            SerpError::Parse(err.to_string())
        } else {
            SerpError::Network(err.to_string())
        }
    }
}
