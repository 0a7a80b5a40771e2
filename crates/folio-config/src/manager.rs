use crate::config::{Config, ConfigError, ConfigResult, RemoteMode};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// 配置管理器
#[derive(Clone)]
pub struct ConfigManager {
    path: PathBuf,
    config: Arc<RwLock<Config>>,
    #[cfg(feature = "hot-reload")]
    watcher: Option<Arc<std::sync::Mutex<notify::RecommendedWatcher>>>,
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ConfigManager {
    /// 加载配置文件，不存在时写入默认配置
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        let config = if path.exists() {
            debug!("Reading config {:?}", path);
            read_config_file(path).await?
        } else {
            info!("No config at {:?}, writing defaults", path);
            let defaults = Config::default();
            write_config_file(path, &defaults).await?;
            defaults
        };

        Ok(Self::new(config, path.to_path_buf()))
    }

    /// 从 ~/.folio/config.json 加载
    pub async fn load_default() -> ConfigResult<Self> {
        Self::load(&Self::default_config_path()?).await
    }

    /// 默认配置路径，找不到用户目录时报错
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        crate::default_config_path()
            .ok_or_else(|| ConfigError::InvalidPath("home directory is unknown".to_string()))
    }

    /// 用内存中的配置创建管理器，不读文件
    pub fn new(config: Config, path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(config)),
            #[cfg(feature = "hot-reload")]
            watcher: None,
        }
    }

    /// 共享的配置句柄
    pub fn get(&self) -> Arc<RwLock<Config>> {
        Arc::clone(&self.config)
    }

    /// 当前配置的副本
    pub async fn snapshot(&self) -> Config {
        self.config.read().await.clone()
    }

    /// 写回自己的配置文件
    pub async fn save(&self) -> ConfigResult<()> {
        self.save_to(&self.path).await?;
        debug!("Wrote config {:?}", self.path);
        Ok(())
    }

    /// 写到任意路径，不改变管理器的文件路径
    pub async fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config = self.snapshot().await;
        write_config_file(path, &config).await
    }

    /// 重新读取文件；新内容无效时保留旧配置
    pub async fn reload(&self) -> ConfigResult<()> {
        if !self.path.exists() {
            return Err(ConfigError::InvalidPath(format!(
                "{:?} does not exist",
                self.path
            )));
        }

        let fresh = read_config_file(&self.path).await?;
        *self.config.write().await = fresh;
        info!("Reloaded config {:?}", self.path);
        Ok(())
    }

    /// 修改配置并保存，修改结果无效时回滚
    pub async fn update<F>(&self, f: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        self.apply(|config| {
            f(config);
            Ok(())
        })
        .await
    }

    /// 按点分键读取
    pub async fn get_value(&self, key: &str) -> Option<String> {
        self.config.read().await.get_value(key)
    }

    /// 按点分键设置并保存
    pub async fn set_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        self.apply(|config| config.set_value(key, value)).await?;
        debug!("Config key {} updated", key);
        Ok(())
    }

    /// 在副本上修改、验证通过后替换并落盘
    async fn apply<F>(&self, f: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config) -> ConfigResult<()>,
    {
        let mut guard = self.config.write().await;
        let mut candidate = guard.clone();
        f(&mut candidate)?;
        Self::validate(&candidate)?;
        *guard = candidate;
        drop(guard);
        self.save().await
    }

    /// 验证配置
    pub fn validate(config: &Config) -> ConfigResult<()> {
        if config.assistant.owner_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "assistant.owner_name cannot be empty".to_string(),
            ));
        }

        if let Some(questions) = &config.assistant.quick_questions {
            if questions.iter().any(|q| q.trim().is_empty()) {
                return Err(ConfigError::Validation(
                    "assistant.quick_questions cannot contain empty entries".to_string(),
                ));
            }
        }

        if config.remote.mode == RemoteMode::Remote {
            let endpoint = config.remote.endpoint.trim();
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "remote.endpoint must be an http(s) URL: {}",
                    config.remote.endpoint
                )));
            }
        }

        if config.history.capacity == 0 {
            return Err(ConfigError::Validation(
                "history.capacity must be greater than 0".to_string(),
            ));
        }

        if config.markup.download_href.trim().is_empty() {
            return Err(ConfigError::Validation(
                "markup.download_href cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn parse(content: &str) -> ConfigResult<Config> {
        let content = Self::expand_env_vars(content)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 展开环境变量 ${VAR} 或 ${VAR:-default}
    pub fn expand_env_vars(content: &str) -> ConfigResult<String> {
        let mut missing = None;
        let expanded = ENV_VAR.replace_all(content, |caps: &regex::Captures<'_>| {
            let var_expr = &caps[1];
            let (var_name, default_value) = match var_expr.find(":-") {
                Some(pos) => (&var_expr[..pos], Some(&var_expr[pos + 2..])),
                None => (var_expr, None),
            };

            match (std::env::var(var_name), default_value) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.to_string(),
                (Err(_), None) => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(ConfigError::EnvVarNotFound(name)),
            None => Ok(expanded.into_owned()),
        }
    }

    /// 配置文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn read_config_file(path: &Path) -> ConfigResult<Config> {
    let raw = tokio::fs::read_to_string(path).await?;
    let config = ConfigManager::parse(&raw)?;
    ConfigManager::validate(&config)?;
    Ok(config)
}

async fn write_config_file(path: &Path, config: &Config) -> ConfigResult<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, serde_json::to_string_pretty(config)?).await?;
    Ok(())
}

#[cfg(feature = "hot-reload")]
impl ConfigManager {
    /// 监听配置文件；内容变化且新配置有效时替换，并以新配置调用 `on_reload`。
    /// 无效的修改只记录警告，旧配置继续生效。
    pub fn watch<F>(&mut self, on_reload: F) -> ConfigResult<()>
    where
        F: Fn(&Config) + Send + 'static,
    {
        use notify::{RecursiveMode, Watcher};

        let (tx, rx) = std::sync::mpsc::channel::<notify::Result<notify::Event>>();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        let path = self.path.clone();
        let shared = Arc::clone(&self.config);
        std::thread::spawn(move || {
            let changes = rx
                .iter()
                .filter_map(Result::ok)
                .filter(|event| event.kind.is_modify());
            for _ in changes {
                let outcome = std::fs::read_to_string(&path)
                    .map_err(ConfigError::from)
                    .and_then(|raw| ConfigManager::parse(&raw))
                    .and_then(|fresh| {
                        ConfigManager::validate(&fresh)?;
                        *shared.blocking_write() = fresh.clone();
                        Ok(fresh)
                    });

                match outcome {
                    Ok(fresh) => {
                        info!("Config {:?} changed on disk, applied", path);
                        on_reload(&fresh);
                    }
                    Err(e) => tracing::warn!("Ignoring config change in {:?}: {}", path, e),
                }
            }
            debug!("Config watcher for {:?} stopped", path);
        });

        self.watcher = Some(Arc::new(std::sync::Mutex::new(watcher)));
        info!("Watching {:?} for changes", self.path);
        Ok(())
    }

    /// 停止监听；watcher 释放后后台线程随之退出
    pub fn unwatch(&mut self) -> ConfigResult<()> {
        use notify::Watcher;

        if let Some(watcher) = self.watcher.take() {
            if let Ok(mut watcher) = watcher.lock() {
                watcher.unwatch(&self.path)?;
            }
            info!("Stopped watching {:?}", self.path);
        }
        Ok(())
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }
}
