use folio_responder::ResponderError;
use folio_session::StorageError;
use thiserror::Error;

/// Errors raised while putting an assistant together. Once built, the assistant
/// reports problems as values instead.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("response table error: {0}")]
    Responder(#[from] ResponderError),

    #[error("history storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("remote client error: {0}")]
    Client(#[from] folio_llm::LLMError),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AssistantError>;
