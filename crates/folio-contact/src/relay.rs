use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ContactError, Result};
use crate::form::ContactForm;

pub const DEFAULT_RELAY_ENDPOINT: &str = "https://api.web3forms.com/submit";
pub const DEFAULT_FROM_NAME: &str = "Portfolio Contact Form";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub endpoint: String,
    pub access_key: String,
    pub from_name: String,
    /// Recipient override; the relay's account default when absent
    pub to_email: Option<String>,
    pub timeout: Option<Duration>,
}

impl RelayConfig {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_RELAY_ENDPOINT.to_string(),
            access_key: access_key.into(),
            from_name: DEFAULT_FROM_NAME.to_string(),
            to_email: None,
            timeout: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_from_name(mut self, from_name: impl Into<String>) -> Self {
        self.from_name = from_name.into();
        self
    }

    pub fn with_to_email(mut self, to_email: impl Into<String>) -> Self {
        self.to_email = Some(to_email.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    access_key: &'a str,
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
    from_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_email: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Posts contact-form submissions to a form-relay service
#[derive(Debug, Clone)]
pub struct ContactRelay {
    config: RelayConfig,
    client: Client,
}

impl ContactRelay {
    pub fn new(config: RelayConfig) -> Result<Self> {
        if config.access_key.trim().is_empty() {
            return Err(ContactError::Config("relay access key is empty".to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ContactError::Config(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Validate and send. The response's `success` flag decides the outcome,
    /// whatever the HTTP status.
    pub async fn send(&self, form: &ContactForm) -> Result<()> {
        form.validate().map_err(ContactError::Validation)?;

        let body = RelayRequest {
            access_key: &self.config.access_key,
            name: form.name.trim(),
            email: form.email.trim(),
            subject: form.subject.trim(),
            message: form.message.trim(),
            from_name: &self.config.from_name,
            to_email: self.config.to_email.as_deref(),
        };

        log::debug!("Sending contact form to {}", self.config.endpoint);
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ContactError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ContactError::Network(e.to_string()))?;
        let result: RelayResponse = serde_json::from_str(&text)?;

        if result.success {
            log::info!("Contact form delivered");
            Ok(())
        } else {
            let message = result
                .message
                .unwrap_or_else(|| format!("relay answered {}", status));
            log::warn!("Contact form rejected: {}", message);
            Err(ContactError::Rejected(message))
        }
    }
}
