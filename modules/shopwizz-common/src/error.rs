use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopWizzError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Upstream provider error ({provider}): {details}")]
    Upstream { provider: String, details: String },

    #[error("Upstream provider timed out ({0})")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl ShopWizzError {
    pub fn upstream(provider: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            details: details.into(),
        }
    }
}
