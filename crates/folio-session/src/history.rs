//! # History Store
//!
//! 有界的会话历史记录：最近归档的在前，超出容量时淘汰最旧的条目。
//! 全部条目以 JSON 数组形式保存在一个键下。

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};
use crate::storage::KeyValueStore;
use crate::types::{ChatSession, HistoryEntry};

/// 默认存储键
pub const DEFAULT_HISTORY_KEY: &str = "chat_history";

/// 默认容量
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// 会话历史记录存储
pub struct HistoryStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    capacity: usize,
    /// 串行化读-改-写
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// 使用默认键和容量创建
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            key: DEFAULT_HISTORY_KEY.to_string(),
            capacity: DEFAULT_HISTORY_CAPACITY,
            write_lock: Mutex::new(()),
        }
    }

    /// 设置容量（最小为 1）
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// 设置存储键
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// 归档会话
    ///
    /// 空会话（不超过一条消息）不归档，返回 `false`。
    /// 已存在相同会话 ID 的条目会被替换并移到最前。
    pub async fn archive(&self, session: &ChatSession) -> StorageResult<bool> {
        if session.is_empty() {
            debug!("Skip archiving empty session: {}", session.id);
            return Ok(false);
        }

        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;

        entries.retain(|e| e.session_id != session.id);
        entries.insert(0, HistoryEntry::from_session(session));

        if entries.len() > self.capacity {
            let evicted = entries.len() - self.capacity;
            entries.truncate(self.capacity);
            debug!("Evicted {} history entries", evicted);
        }

        self.write_entries(&entries).await?;
        info!(
            "Archived session {} ({} messages)",
            session.id,
            session.messages.len()
        );
        Ok(true)
    }

    /// 列出全部条目，最近归档的在前
    pub async fn list(&self) -> StorageResult<Vec<HistoryEntry>> {
        self.read_entries().await
    }

    /// 按会话 ID 查找条目
    pub async fn load(&self, session_id: &str) -> StorageResult<Option<HistoryEntry>> {
        let entries = self.read_entries().await?;
        Ok(entries.into_iter().find(|e| e.session_id == session_id))
    }

    /// 删除单个条目，返回是否存在
    pub async fn remove(&self, session_id: &str) -> StorageResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        let before = entries.len();
        entries.retain(|e| e.session_id != session_id);

        if entries.len() == before {
            return Ok(false);
        }
        self.write_entries(&entries).await?;
        debug!("Removed history entry: {}", session_id);
        Ok(true)
    }

    /// 清空历史记录
    pub async fn clear(&self) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        self.kv.remove(&self.key).await?;
        info!("History cleared");
        Ok(())
    }

    /// 条目数量
    pub async fn len(&self) -> StorageResult<usize> {
        Ok(self.read_entries().await?.len())
    }

    pub async fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// 读取条目；内容损坏时视为空历史
    async fn read_entries(&self) -> StorageResult<Vec<HistoryEntry>> {
        let raw = match self.kv.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            // 非 UTF-8 内容同样按损坏处理
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                warn!("Unreadable history under '{}', treating as empty: {}", self.key, e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(self.capacity);
                Ok(entries)
            }
            Err(e) => {
                warn!("Corrupted history under '{}', treating as empty: {}", self.key, e);
                Ok(Vec::new())
            }
        }
    }

    async fn write_entries(&self, entries: &[HistoryEntry]) -> StorageResult<()> {
        let content = serde_json::to_string(entries)?;
        self.kv.set(&self.key, &content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use folio_core::Message;

    fn store() -> (Arc<MemoryKeyValueStore>, HistoryStore) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let history = HistoryStore::new(kv.clone());
        (kv, history)
    }

    fn session(question: &str) -> ChatSession {
        let mut session = ChatSession::new();
        session.push(Message::assistant("Hi!"));
        session.push(Message::user(question));
        session.push(Message::assistant("Answer"));
        session
    }

    #[tokio::test]
    async fn test_greeting_only_archive_is_noop() {
        let (kv, history) = store();
        let mut greeting_only = ChatSession::new();
        greeting_only.push(Message::assistant("Hi!"));

        assert!(!history.archive(&greeting_only).await.unwrap());
        assert!(!history.archive(&ChatSession::new()).await.unwrap());
        assert!(history.list().await.unwrap().is_empty());
        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let (_kv, history) = store();
        let sessions: Vec<ChatSession> = (0..11).map(|i| session(&format!("q{}", i))).collect();
        for s in &sessions {
            assert!(history.archive(s).await.unwrap());
        }

        let entries = history.list().await.unwrap();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].title, "q10");
        assert_eq!(entries[9].title, "q1");
        assert!(history.load(&sessions[0].id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rearchive_replaces_and_moves_to_front() {
        let (_kv, history) = store();
        let mut first = session("first");
        let second = session("second");
        history.archive(&first).await.unwrap();
        history.archive(&second).await.unwrap();

        first.push(Message::user("follow-up"));
        history.archive(&first).await.unwrap();

        let entries = history.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].session_id, first.id);
        assert_eq!(entries[0].message_count(), 4);
        assert_eq!(entries[1].session_id, second.id);
    }

    #[tokio::test]
    async fn test_load_remove_clear() {
        let (_kv, history) = store();
        let a = session("a");
        let b = session("b");
        history.archive(&a).await.unwrap();
        history.archive(&b).await.unwrap();

        let loaded = history.load(&a.id).await.unwrap().unwrap();
        assert_eq!(loaded.messages, a.messages);

        assert!(history.remove(&a.id).await.unwrap());
        assert!(!history.remove(&a.id).await.unwrap());
        assert_eq!(history.len().await.unwrap(), 1);

        history.clear().await.unwrap();
        assert!(history.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupted_storage_reads_empty() {
        let (kv, history) = store();
        kv.set(DEFAULT_HISTORY_KEY, "{not json").await.unwrap();
        assert!(history.list().await.unwrap().is_empty());

        // 损坏的内容在下一次归档时被覆盖
        history.archive(&session("fresh")).await.unwrap();
        assert_eq!(history.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_capacity() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let history = HistoryStore::new(kv).with_capacity(2).with_key("other_history");
        for i in 0..3 {
            history.archive(&session(&format!("{}", i))).await.unwrap();
        }
        let titles: Vec<String> = history
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["2", "1"]);
        assert_eq!(history.key(), "other_history");
    }
}
