use thiserror::Error;

use crate::form::FieldError;

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("invalid form: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", "))]
    Validation(Vec<FieldError>),

    #[error("network error: {0}")]
    Network(String),

    #[error("relay rejected the message: {0}")]
    Rejected(String),

    #[error("unreadable relay response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ContactError>;
