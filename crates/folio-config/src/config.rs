use std::time::Duration;

use folio_markup::MarkupConfig;
use serde::{Deserialize, Serialize};

/// 主配置结构体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub markup: MarkupConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            assistant: AssistantConfig::default(),
            remote: RemoteConfig::default(),
            history: HistoryConfig::default(),
            markup: MarkupConfig::default(),
            contact: ContactConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// 按点分键读取配置值
    pub fn get_value(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["version"] => Some(self.version.clone()),
            ["assistant", "owner_name"] => Some(self.assistant.owner_name.clone()),
            ["assistant", "greeting"] => self.assistant.greeting.clone(),
            ["assistant", "responses_path"] => self.assistant.responses_path.clone(),
            ["assistant", "offline_delay_ms"] => {
                self.assistant.offline_delay_ms.map(|ms| ms.to_string())
            }
            ["remote", "mode"] => Some(self.remote.mode.to_string()),
            ["remote", "endpoint"] => Some(self.remote.endpoint.clone()),
            ["remote", "chatbot_id"] => self.remote.chatbot_id.clone(),
            ["remote", "token_env"] => self.remote.token_env.clone(),
            ["remote", "timeout_secs"] => self.remote.timeout_secs.map(|secs| secs.to_string()),
            ["history", "storage_path"] => Some(self.history.storage_path.clone()),
            ["history", "capacity"] => Some(self.history.capacity.to_string()),
            ["markup", "download_href"] => Some(self.markup.download_href.clone()),
            ["markup", "download_label"] => Some(self.markup.download_label.clone()),
            ["contact", "endpoint"] => Some(self.contact.endpoint.clone()),
            ["contact", "access_key_env"] => Some(self.contact.access_key_env.clone()),
            ["contact", "from_name"] => Some(self.contact.from_name.clone()),
            ["contact", "to_email"] => self.contact.to_email.clone(),
            ["logging", "level"] => Some(self.logging.level.to_string()),
            ["logging", "file"] => self.logging.file.clone(),
            ["logging", "json_format"] => Some(self.logging.json_format.to_string()),
            _ => None,
        }
    }

    /// 按点分键设置配置值
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["assistant", "owner_name"] => {
                self.assistant.owner_name = value.to_string();
            }
            ["assistant", "greeting"] => {
                self.assistant.greeting = Some(value.to_string());
            }
            ["assistant", "responses_path"] => {
                self.assistant.responses_path = Some(value.to_string());
            }
            ["assistant", "offline_delay_ms"] => {
                self.assistant.offline_delay_ms = Some(value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid number: {}", value))
                })?);
            }
            ["remote", "mode"] => {
                self.remote.mode = value.parse()?;
            }
            ["remote", "endpoint"] => {
                self.remote.endpoint = value.to_string();
            }
            ["remote", "chatbot_id"] => {
                self.remote.chatbot_id = Some(value.to_string());
            }
            ["remote", "token_env"] => {
                self.remote.token_env = Some(value.to_string());
            }
            ["remote", "timeout_secs"] => {
                let secs: u64 = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid number: {}", value))
                })?;
                self.remote.timeout_secs = (secs > 0).then_some(secs);
            }
            ["history", "storage_path"] => {
                self.history.storage_path = value.to_string();
            }
            ["history", "capacity"] => {
                self.history.capacity = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid number: {}", value))
                })?;
            }
            ["markup", "download_href"] => {
                self.markup.download_href = value.to_string();
            }
            ["markup", "download_label"] => {
                self.markup.download_label = value.to_string();
            }
            ["contact", "endpoint"] => {
                self.contact.endpoint = value.to_string();
            }
            ["contact", "access_key_env"] => {
                self.contact.access_key_env = value.to_string();
            }
            ["contact", "from_name"] => {
                self.contact.from_name = value.to_string();
            }
            ["contact", "to_email"] => {
                self.contact.to_email = Some(value.to_string());
            }
            ["logging", "level"] => {
                self.logging.level = value.parse()?;
            }
            ["logging", "file"] => {
                self.logging.file = Some(value.to_string());
            }
            ["logging", "json_format"] => {
                self.logging.json_format = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid boolean: {}", value))
                })?;
            }
            _ => return Err(ConfigError::KeyNotFound(key.to_string())),
        }
        Ok(())
    }
}

/// 助手配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    /// 回复模板中 `{name}` 的替换值
    pub owner_name: String,
    /// 覆盖默认欢迎语
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    /// 覆盖默认快捷问题
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_questions: Option<Vec<String>>,
    /// 自定义规则回复表（JSON 文件）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses_path: Option<String>,
    /// 离线模式下模拟输入的延迟（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_delay_ms: Option<u64>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            owner_name: "Rolando".to_string(),
            greeting: None,
            quick_questions: None,
            responses_path: None,
            offline_delay_ms: None,
        }
    }
}

/// 回复来源模式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RemoteMode {
    /// 先请求远程服务，失败时回退到规则回复
    #[default]
    Remote,
    /// 只使用规则回复
    Offline,
}

impl std::fmt::Display for RemoteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteMode::Remote => write!(f, "remote"),
            RemoteMode::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for RemoteMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "remote" => Ok(RemoteMode::Remote),
            "offline" => Ok(RemoteMode::Offline),
            _ => Err(ConfigError::Validation(format!("Invalid remote mode: {}", s))),
        }
    }
}

/// 远程回复服务配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    pub mode: RemoteMode,
    pub endpoint: String,
    /// 设置后直接调用托管 API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chatbot_id: Option<String>,
    /// 保存 bearer token 的环境变量名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
    /// 请求超时（秒），未设置或为 0 时不限制
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            mode: RemoteMode::Remote,
            endpoint: "http://localhost:3000/api/chat".to_string(),
            chatbot_id: None,
            token_env: None,
            timeout_secs: None,
        }
    }
}

impl RemoteConfig {
    /// 从环境变量读取 bearer token
    pub fn bearer_token(&self) -> Option<String> {
        self.token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|token| !token.trim().is_empty())
    }

    /// 生效的请求超时
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// 历史记录配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub storage_path: String,
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_path: "~/.folio/storage".to_string(),
            capacity: 10,
        }
    }
}

/// 联系表单转发配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContactConfig {
    pub endpoint: String,
    /// 保存转发服务 access key 的环境变量名
    pub access_key_env: String,
    pub from_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_email: Option<String>,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.web3forms.com/submit".to_string(),
            access_key_env: "FOLIO_CONTACT_ACCESS_KEY".to_string(),
            from_name: "Portfolio Contact Form".to_string(),
            to_email: None,
        }
    }
}

impl ContactConfig {
    pub fn access_key(&self) -> Option<String> {
        std::env::var(&self.access_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::Validation(format!("Invalid log level: {}", s))),
        }
    }
}

/// Logging 配置
///
/// 控制台日志写到 stderr；交互式聊天默认只输出 warn 及以上。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            file: None,
            json_format: false,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Watch error: {0}")]
    #[cfg(feature = "hot-reload")]
    Watch(#[from] notify::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
