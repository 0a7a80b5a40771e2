use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// How the client authenticates against the chat endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication; the portfolio's own relay route holds the secret
    #[default]
    None,
    /// `Authorization: Bearer <token>`
    Bearer { token: String },
}

impl AuthConfig {
    /// Bearer auth from an environment variable, if it is set and non-empty
    pub fn bearer_from_env(env_var: &str) -> Option<Self> {
        std::env::var(env_var)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(|token| Self::Bearer { token })
    }
}

/// Remote chat endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteClientConfig {
    /// Full URL the transcript is POSTed to
    pub endpoint: String,
    /// Set when talking to the hosted chatbot API directly instead of the relay
    #[serde(default)]
    pub chatbot_id: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Request timeout in seconds; no timeout when absent
    #[serde(default, with = "serde_opt_duration")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl RemoteClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            chatbot_id: None,
            auth: AuthConfig::None,
            timeout: None,
            headers: HashMap::new(),
        }
    }

    pub fn with_chatbot_id(mut self, chatbot_id: impl Into<String>) -> Self {
        self.chatbot_id = Some(chatbot_id.into());
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthConfig::Bearer {
            token: token.into(),
        };
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

mod serde_opt_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
