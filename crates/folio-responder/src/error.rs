use thiserror::Error;

use crate::table::Topic;

#[derive(Error, Debug)]
pub enum ResponderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid keyword '{keyword}' in {topic} bucket")]
    InvalidKeyword { topic: Topic, keyword: String },

    #[error("Bucket {0} has no replies")]
    EmptyBucket(Topic),

    #[error("Topic {0} appears in more than one bucket")]
    DuplicateTopic(Topic),
}

pub type ResponderResult<T> = Result<T, ResponderError>;
