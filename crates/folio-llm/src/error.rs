use thiserror::Error;

/// Failure of a single remote call. Callers decide what to fall back to.
#[derive(Error, Debug)]
pub enum LLMError {
    #[error("network error: {0}")]
    Network(String),

    #[error("api error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("parse error: {0}")]
    Parse(#[from] ConversionError),

    #[error("config error: {0}")]
    Config(String),
}

/// Error converting between the internal request/reply types and a wire body
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("empty reply")]
    EmptyReply,

    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

impl LLMError {
    /// True for errors a later identical request might not hit
    pub fn is_transient(&self) -> bool {
        match self {
            LLMError::Network(_) => true,
            LLMError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LLMError>;
