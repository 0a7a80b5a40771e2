pub mod chat;
pub mod types;

pub use chat::{ChatReply, ChatRequest, ReplySource, TranscriptMessage};
pub use types::{Message, MessageId, Role};
