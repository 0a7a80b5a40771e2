use serde::{Deserialize, Serialize};

use crate::types::{Message, Role};

/// One role-tagged entry of the transcript sent to the remote endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for TranscriptMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Non-streaming chat request: the whole conversation so far, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<TranscriptMessage>,
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from a message log, preserving order
    pub fn from_messages<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Self {
        Self {
            messages: messages.into_iter().map(TranscriptMessage::from).collect(),
            conversation_id: None,
        }
    }

    /// Add a message to the request
    pub fn with_message(mut self, role: Role, content: impl Into<String>) -> Self {
        self.messages.push(TranscriptMessage {
            role,
            content: content.into(),
        });
        self
    }

    /// Tag the request with a conversation id for tracking
    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    /// Content of the most recent user entry
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_messages_keeps_order() {
        let log = vec![
            Message::assistant("greeting"),
            Message::user("hello"),
            Message::assistant("hi!"),
        ];
        let request = ChatRequest::from_messages(&log).with_conversation_id("conv-1");

        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, Role::Assistant);
        assert_eq!(request.messages[1].content, "hello");
        assert_eq!(request.conversation_id.as_deref(), Some("conv-1"));
    }

    #[test]
    fn test_last_user_content() {
        let request = ChatRequest::new()
            .with_message(Role::User, "first")
            .with_message(Role::Assistant, "reply")
            .with_message(Role::User, "second");
        assert_eq!(request.last_user_content(), Some("second"));

        assert_eq!(ChatRequest::new().last_user_content(), None);
    }
}
