use async_trait::async_trait;
use folio_core::chat::{ChatReply, ChatRequest};
use reqwest::{header, Client};
use serde_json::Value;

use crate::client::ResponseClient;
use crate::config::{AuthConfig, RemoteClientConfig};
use crate::error::{ConversionError, LLMError, Result};
use crate::transformer::{HostedSchema, RelaySchema, SchemaTransformer};

/// Sends the transcript to a remote chat endpoint over HTTP and waits for one
/// non-streaming reply.
pub struct HttpResponseClient {
    config: RemoteClientConfig,
    http_client: Client,
    transformer: Box<dyn SchemaTransformer>,
}

impl HttpResponseClient {
    /// The request schema follows the config: hosted when a chatbot id is set,
    /// relay otherwise.
    pub fn new(config: RemoteClientConfig) -> Result<Self> {
        let transformer: Box<dyn SchemaTransformer> = match &config.chatbot_id {
            Some(id) => Box::new(HostedSchema::new(id.clone())),
            None => Box::new(RelaySchema),
        };
        Self::with_transformer(config, transformer)
    }

    pub fn with_transformer(
        config: RemoteClientConfig,
        transformer: Box<dyn SchemaTransformer>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| LLMError::Config(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
            transformer,
        })
    }

    pub fn config(&self) -> &RemoteClientConfig {
        &self.config
    }

    fn build_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if let AuthConfig::Bearer { token } = &self.config.auth {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| LLMError::Config(format!("Invalid auth header value: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        for (key, value) in &self.config.headers {
            let header_name = header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| LLMError::Config(format!("Invalid header name: {}", e)))?;
            let header_value = header::HeaderValue::from_str(value)
                .map_err(|e| LLMError::Config(format!("Invalid header value: {}", e)))?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }

    pub async fn send_request(&self, request: ChatRequest) -> Result<ChatReply> {
        let body = self.transformer.transform_request(&request)?;
        let headers = self.build_headers()?;

        log::debug!(
            "POST {} ({} schema, {} messages)",
            self.config.endpoint,
            self.transformer.schema_id(),
            request.messages.len()
        );

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(&text);
            log::warn!("Chat endpoint returned {}: {}", status, message);
            return Err(match status.as_u16() {
                401 | 403 => LLMError::Auth(message),
                code => LLMError::Api {
                    status: code,
                    message,
                },
            });
        }

        let data: Value = serde_json::from_str(&text).map_err(ConversionError::from)?;
        Ok(self.transformer.parse_response(&data)?)
    }
}

#[async_trait]
impl ResponseClient for HttpResponseClient {
    fn client_id(&self) -> &str {
        self.transformer.schema_id()
    }

    async fn ask(&self, request: ChatRequest) -> Result<ChatReply> {
        self.send_request(request).await
    }
}

/// Prefer the `error` field of a JSON error body, fall back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Role;
    use mockito::Matcher;
    use serde_json::json;

    fn request() -> ChatRequest {
        ChatRequest::new()
            .with_message(Role::Assistant, "Hi! How can I help?")
            .with_message(Role::User, "What tech do you use?")
    }

    #[tokio::test]
    async fn test_relay_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "messages": [
                    {"role": "assistant", "content": "Hi! How can I help?"},
                    {"role": "user", "content": "What tech do you use?"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"text": "Mostly **Rust** and TypeScript."}"#)
            .create_async()
            .await;

        let client =
            HttpResponseClient::new(RemoteClientConfig::new(format!("{}/api/chat", server.url())))
                .unwrap();
        let reply = client.ask(request()).await.unwrap();

        assert_eq!(reply.text, "Mostly **Rust** and TypeScript.");
        assert_eq!(client.client_id(), "relay");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_hosted_mode_sends_chatbot_id_and_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/chat")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "chatbotId": "bot-7",
                "stream": false,
                "conversationId": "conv-9"
            })))
            .with_status(200)
            .with_body(r#"{"text": "hosted reply"}"#)
            .create_async()
            .await;

        let config = RemoteClientConfig::new(format!("{}/api/v1/chat", server.url()))
            .with_chatbot_id("bot-7")
            .with_bearer_token("sk-test");
        let client = HttpResponseClient::new(config).unwrap();
        let reply = client
            .ask(request().with_conversation_id("conv-9"))
            .await
            .unwrap();

        assert_eq!(reply.text, "hosted reply");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_maps_to_api() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(500)
            .with_body(r#"{"error": "Failed to get response from Chatbase"}"#)
            .create_async()
            .await;

        let client =
            HttpResponseClient::new(RemoteClientConfig::new(format!("{}/api/chat", server.url())))
                .unwrap();
        match client.ask(request()).await {
            Err(LLMError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "Failed to get response from Chatbase");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let client =
            HttpResponseClient::new(RemoteClientConfig::new(format!("{}/api/chat", server.url())))
                .unwrap();
        assert!(matches!(client.ask(request()).await, Err(LLMError::Auth(m)) if m == "Unauthorized"));
    }

    #[tokio::test]
    async fn test_unparseable_body_maps_to_parse() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let client =
            HttpResponseClient::new(RemoteClientConfig::new(format!("{}/api/chat", server.url())))
                .unwrap();
        assert!(matches!(
            client.ask(request()).await,
            Err(LLMError::Parse(ConversionError::Json(_)))
        ));
    }

    #[tokio::test]
    async fn test_empty_reply_maps_to_parse() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(r#"{"text": ""}"#)
            .create_async()
            .await;

        let client =
            HttpResponseClient::new(RemoteClientConfig::new(format!("{}/api/chat", server.url())))
                .unwrap();
        assert!(matches!(
            client.ask(request()).await,
            Err(LLMError::Parse(ConversionError::EmptyReply))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_network() {
        // nothing listens on port 9 on a test machine
        let client =
            HttpResponseClient::new(RemoteClientConfig::new("http://127.0.0.1:9/api/chat")).unwrap();
        let err = client.ask(request()).await.unwrap_err();
        assert!(matches!(err, LLMError::Network(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_invalid_custom_header_is_config_error() {
        let config = RemoteClientConfig::new("http://localhost/api/chat").with_header("bad header", "x");
        let client = HttpResponseClient::new(config).unwrap();
        assert!(matches!(client.build_headers(), Err(LLMError::Config(_))));
    }
}
