//! # Key-Value Storage
//!
//! 本地键值存储抽象，以及文件与内存两种实现。

use std::path::PathBuf;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// 键值存储 trait
///
/// 每个键保存一个完整的字符串值，写入即整体替换。
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 读取键值，不存在时返回 None
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// 写入键值（完整替换）
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// 删除键，不存在时不报错
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// 检查存储键是否合法：非空，仅包含字母、数字、`_`、`-`、`.`，且不以 `.` 开头
fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// 基于文件的键值存储
///
/// 存储结构:
/// ```
/// <base_path>/
/// ├── chat_history.json
/// └── ...
/// ```
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    /// 创建存储，`~` 会展开为用户目录，目录不存在时自动创建
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path_str = base_path.into().to_string_lossy().to_string();
        let base_path = PathBuf::from(shellexpand::tilde(&base_path_str).as_ref());

        fs::create_dir_all(&base_path).await?;
        info!("FileKeyValueStore initialized at {:?}", base_path);

        Ok(Self { base_path })
    }

    /// 存储根目录
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path).await?))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        let path = self.key_path(key);
        // 先写临时文件再重命名
        let tmp = self.base_path.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        debug!("Stored key: {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let path = self.key_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 内存键值存储，进程退出即丢失，用于测试和离线演示
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: DashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 键数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries.remove(key);
        Ok(())
    }
}
