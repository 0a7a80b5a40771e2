pub mod request;
pub mod response;

pub use request::{ChatRequest, TranscriptMessage};
pub use response::{ChatReply, ReplySource};
