use folio_core::chat::{ChatReply, ChatRequest};
use serde_json::{json, Value};

use crate::error::ConversionError;

/// Converts between the internal request/reply types and one endpoint's JSON shape
pub trait SchemaTransformer: Send + Sync {
    fn schema_id(&self) -> &str;

    fn transform_request(&self, request: &ChatRequest) -> Result<Value, ConversionError>;

    fn parse_response(&self, data: &Value) -> Result<ChatReply, ConversionError>;
}

/// The portfolio's own relay route: `{messages, conversationId?}` in, `{text}` out
#[derive(Debug, Clone, Default)]
pub struct RelaySchema;

impl SchemaTransformer for RelaySchema {
    fn schema_id(&self) -> &str {
        "relay"
    }

    fn transform_request(&self, request: &ChatRequest) -> Result<Value, ConversionError> {
        let mut body = json!({ "messages": transcript(request)? });
        if let Some(id) = &request.conversation_id {
            body["conversationId"] = json!(id);
        }
        Ok(body)
    }

    fn parse_response(&self, data: &Value) -> Result<ChatReply, ConversionError> {
        reply_text(data)
    }
}

/// The hosted chatbot API called directly: adds `chatbotId` and disables streaming
#[derive(Debug, Clone)]
pub struct HostedSchema {
    chatbot_id: String,
}

impl HostedSchema {
    pub fn new(chatbot_id: impl Into<String>) -> Self {
        Self {
            chatbot_id: chatbot_id.into(),
        }
    }
}

impl SchemaTransformer for HostedSchema {
    fn schema_id(&self) -> &str {
        "hosted"
    }

    fn transform_request(&self, request: &ChatRequest) -> Result<Value, ConversionError> {
        let mut body = json!({
            "chatbotId": self.chatbot_id,
            "messages": transcript(request)?,
            "stream": false,
        });
        if let Some(id) = &request.conversation_id {
            body["conversationId"] = json!(id);
        }
        Ok(body)
    }

    fn parse_response(&self, data: &Value) -> Result<ChatReply, ConversionError> {
        reply_text(data)
    }
}

fn transcript(request: &ChatRequest) -> Result<Value, ConversionError> {
    if request.messages.is_empty() {
        return Err(ConversionError::InvalidFormat(
            "transcript has no messages".to_string(),
        ));
    }
    Ok(serde_json::to_value(&request.messages)?)
}

/// Reply text from `text`, or `reply` as an alias. Blank text is an error.
fn reply_text(data: &Value) -> Result<ChatReply, ConversionError> {
    let text = data
        .get("text")
        .or_else(|| data.get("reply"))
        .ok_or_else(|| ConversionError::MissingField("text".to_string()))?
        .as_str()
        .ok_or_else(|| ConversionError::InvalidFormat("reply text is not a string".to_string()))?;

    if text.trim().is_empty() {
        return Err(ConversionError::EmptyReply);
    }
    Ok(ChatReply::new(text))
}
