//! # Session Types
//!
//! 会话与历史记录条目的数据结构。

use chrono::{DateTime, Utc};
use folio_core::{Message, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 历史标题的最大字符数
pub const TITLE_MAX_CHARS: usize = 40;

/// 没有用户消息时使用的标题
pub const UNTITLED: &str = "New conversation";

/// 一次对话会话
///
/// 消息按插入顺序保存，即显示顺序，永不重排。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// 会话 ID，会话结束或新建前保持不变
    pub id: String,
    /// 开始时间
    pub started_at: DateTime<Utc>,
    /// 消息列表
    pub messages: Vec<Message>,
}

impl ChatSession {
    /// 创建新会话（随机 ID）
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// 使用指定 ID 创建会话
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            started_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    /// 从历史条目恢复会话，沿用条目的会话 ID
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.session_id.clone(),
            started_at: entry
                .messages
                .first()
                .map(|m| m.created_at)
                .unwrap_or(entry.archived_at),
            messages: entry.messages.clone(),
        }
    }

    /// 添加消息
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// 消息数不超过一条（只有问候语）的会话视为空会话，不会被归档
    pub fn is_empty(&self) -> bool {
        self.messages.len() <= 1
    }

    /// 是否已有用户消息
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::User)
    }

    /// 第一条用户消息
    pub fn first_user_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == Role::User)
    }

    /// 根据 ID 查找消息
    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// 历史记录条目：一次已归档会话的完整快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub session_id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub archived_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// 从会话生成条目，标题取自第一条用户消息
    pub fn from_session(session: &ChatSession) -> Self {
        Self {
            session_id: session.id.clone(),
            title: derive_title(session),
            messages: session.messages.clone(),
            archived_at: Utc::now(),
        }
    }

    /// 消息数量
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// 标题：第一条用户消息，超过 40 个字符时截断并加省略号
pub fn derive_title(session: &ChatSession) -> String {
    let Some(first) = session.first_user_message() else {
        return UNTITLED.to_string();
    };

    let text = first.content.trim();
    if text.chars().count() > TITLE_MAX_CHARS {
        let truncated: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", truncated.trim_end())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(user_text: &str) -> ChatSession {
        let mut session = ChatSession::new();
        session.push(Message::assistant("Hi!"));
        session.push(Message::user(user_text));
        session.push(Message::assistant("Sure."));
        session
    }

    #[test]
    fn test_empty_session() {
        let mut session = ChatSession::new();
        assert!(session.is_empty());
        session.push(Message::assistant("greeting"));
        assert!(session.is_empty());
        session.push(Message::user("hello"));
        assert!(!session.is_empty());
    }

    #[test]
    fn test_short_title() {
        let entry = HistoryEntry::from_session(&session_with("  hello  "));
        assert_eq!(entry.title, "hello");
        assert_eq!(entry.message_count(), 3);
    }

    #[test]
    fn test_long_title_truncated() {
        let text = "Could you walk me through the architecture of your latest project?";
        let title = derive_title(&session_with(text));
        assert!(title.ends_with("..."));
        assert!(title.chars().count() <= TITLE_MAX_CHARS + 3);
        assert!(text.starts_with(title.trim_end_matches("...")));
    }

    #[test]
    fn test_title_counts_chars_not_bytes() {
        let text = "é".repeat(41);
        let title = derive_title(&session_with(&text));
        assert_eq!(title, format!("{}...", "é".repeat(40)));
    }

    #[test]
    fn test_untitled() {
        let mut session = ChatSession::new();
        session.push(Message::assistant("a"));
        session.push(Message::assistant("b"));
        assert_eq!(derive_title(&session), UNTITLED);
    }

    #[test]
    fn test_restore_keeps_session_id() {
        let original = session_with("hello");
        let entry = HistoryEntry::from_session(&original);
        let restored = ChatSession::from_entry(&entry);
        assert_eq!(restored.id, original.id);
        assert_eq!(restored.messages, original.messages);
    }

    #[test]
    fn test_entry_wire_format() {
        let entry = HistoryEntry::from_session(&session_with("hello"));
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("session_id").is_some());
        assert!(json.get("archived_at").is_some());
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
    }
}
