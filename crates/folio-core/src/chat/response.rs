/// Where an assistant reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    /// The remote chat endpoint answered
    Remote,
    /// The remote call failed and the scripted responder answered instead
    Fallback,
    /// Offline mode, the scripted responder is the only source
    Rules,
}

impl std::fmt::Display for ReplySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplySource::Remote => write!(f, "remote"),
            ReplySource::Fallback => write!(f, "fallback"),
            ReplySource::Rules => write!(f, "rules"),
        }
    }
}

/// Single non-streaming chat reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
}

impl ChatReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
