//! # Folio Session Storage
//!
//! 助手会话与历史记录的本地持久化。
//!
//! ## 功能特性
//!
//! - **会话类型**：会话 ID、开始时间、有序消息列表
//! - **历史记录**：最多 10 条，最近归档的在前，超出时淘汰最旧的
//! - **键值存储**：文件实现（每个键一个文件）与内存实现
//! - **容错读取**：存储内容损坏时视为空历史
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use folio_session::{ChatSession, FileKeyValueStore, HistoryStore};
//! use folio_core::Message;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let kv = Arc::new(FileKeyValueStore::new("~/.folio/storage").await?);
//!     let history = HistoryStore::new(kv);
//!
//!     let mut session = ChatSession::new();
//!     session.push(Message::assistant("Hi!"));
//!     session.push(Message::user("What's your experience?"));
//!     history.archive(&session).await?;
//!
//!     for entry in history.list().await? {
//!         println!("{} {}", entry.session_id, entry.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod history;
pub mod storage;
pub mod types;

// 重新导出主要类型
pub use error::{StorageError, StorageResult};
pub use history::{HistoryStore, DEFAULT_HISTORY_CAPACITY, DEFAULT_HISTORY_KEY};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use types::{derive_title, ChatSession, HistoryEntry, TITLE_MAX_CHARS};

/// 默认存储路径
pub fn default_storage_path() -> std::path::PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".folio").join("storage"))
        .unwrap_or_else(|| std::path::PathBuf::from("./folio_storage"))
}
