use std::sync::Arc;
use std::time::Duration;

use folio_assistant::{Assistant, AssistantError, AssistantOptions};
use folio_config::{Config, ConfigManager, ContactConfig, HistoryConfig, RemoteConfig, RemoteMode};
use folio_contact::{ContactError, ContactRelay, RelayConfig};
use folio_llm::{HttpResponseClient, RemoteClientConfig};
use folio_markup::MarkupRenderer;
use folio_observability::LogManager;
use folio_responder::{Responder, ResponseTable};
use folio_session::{FileKeyValueStore, HistoryStore};
use parking_lot::Mutex;
use tracing::{debug, warn};

pub async fn build_history(config: &HistoryConfig) -> folio_assistant::Result<Arc<HistoryStore>> {
    let kv = FileKeyValueStore::new(&config.storage_path).await?;
    Ok(Arc::new(
        HistoryStore::new(Arc::new(kv)).with_capacity(config.capacity),
    ))
}

fn build_table(config: &Config) -> folio_assistant::Result<ResponseTable> {
    let owner = &config.assistant.owner_name;
    match &config.assistant.responses_path {
        Some(path) => {
            let path = folio_config::expand_tilde(path).ok_or_else(|| {
                AssistantError::Config(format!("cannot resolve responses path {}", path))
            })?;
            debug!("Loading response table from {:?}", path);
            Ok(ResponseTable::from_file(path, owner)?)
        }
        None => Ok(ResponseTable::builtin(owner)),
    }
}

fn build_options(config: &Config) -> AssistantOptions {
    let section = &config.assistant;
    let mut options = AssistantOptions::for_owner(&section.owner_name);
    if let Some(greeting) = &section.greeting {
        options = options.with_greeting(greeting.clone());
    }
    if let Some(questions) = &section.quick_questions {
        options = options.with_quick_questions(questions.clone());
    }
    if let Some(ms) = section.offline_delay_ms {
        options = options.with_offline_delay(Duration::from_millis(ms));
    }
    options
}

pub fn remote_client_config(remote: &RemoteConfig) -> RemoteClientConfig {
    let mut config = RemoteClientConfig::new(remote.endpoint.clone());
    if let Some(timeout) = remote.timeout() {
        config = config.with_timeout(timeout);
    }
    if let Some(chatbot_id) = &remote.chatbot_id {
        config = config.with_chatbot_id(chatbot_id.clone());
    }
    if let Some(token) = remote.bearer_token() {
        config = config.with_bearer_token(token);
    }
    config
}

/// Wire an assistant from config. `force_offline` skips the remote client
/// whatever the configured mode.
pub async fn build_assistant(config: &Config, force_offline: bool) -> folio_assistant::Result<Assistant> {
    let mut assistant = Assistant::new(Responder::new(build_table(config)?))
        .with_history(build_history(&config.history).await?)
        .with_renderer(MarkupRenderer::new(config.markup.clone()))
        .with_options(build_options(config));

    if !force_offline && config.remote.mode == RemoteMode::Remote {
        let client = HttpResponseClient::new(remote_client_config(&config.remote))?;
        assistant = assistant.with_client(Arc::new(client));
    }

    Ok(assistant)
}

pub fn build_relay(contact: &ContactConfig) -> Result<ContactRelay, ContactError> {
    let access_key = contact.access_key().ok_or_else(|| {
        ContactError::Config(format!(
            "environment variable {} is not set",
            contact.access_key_env
        ))
    })?;

    let mut relay = RelayConfig::new(access_key)
        .with_endpoint(contact.endpoint.clone())
        .with_from_name(contact.from_name.clone());
    if let Some(to_email) = &contact.to_email {
        relay = relay.with_to_email(to_email.clone());
    }
    ContactRelay::new(relay)
}

/// Apply `logging.level` edits made while a chat is running. The watch stops
/// when `manager` is dropped.
pub fn follow_log_level(
    manager: &mut ConfigManager,
    log_manager: Arc<Mutex<LogManager>>,
) -> Result<(), folio_config::ConfigError> {
    manager.watch(move |config| {
        let level = config.logging.level.to_string();
        let mut log_manager = log_manager.lock();
        if log_manager.config().level == level {
            return;
        }
        if let Err(e) = log_manager.update_level(&level) {
            warn!("Failed to apply log level {}: {}", level, e);
        }
    })
}
