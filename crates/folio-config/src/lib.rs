//! Folio 配置
//!
//! JSON 配置文件位于 `~/.folio/config.json`，支持 `${VAR}` 环境变量展开和热重载。
//! 密钥类配置（bearer token、联系表单 access key）只保存环境变量名。

pub mod config;
pub mod manager;

pub use config::{
    AssistantConfig, Config, ConfigError, ConfigResult, ContactConfig, HistoryConfig, LogLevel,
    LoggingConfig, RemoteConfig, RemoteMode,
};
pub use manager::ConfigManager;

use std::path::PathBuf;

/// 获取 Folio 配置目录路径
pub fn folio_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".folio"))
}

/// 获取默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    folio_dir().map(|dir| dir.join("config.json"))
}

/// 获取默认日志文件路径
pub fn default_log_path() -> Option<PathBuf> {
    folio_dir().map(|dir| dir.join("logs").join("folio.log"))
}

/// 展开路径中的 ~ 为用户主目录
pub fn expand_tilde(path: &str) -> Option<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir().map(|home| home.join(rest))
    } else if path == "~" {
        dirs::home_dir()
    } else {
        Some(PathBuf::from(path))
    }
}
