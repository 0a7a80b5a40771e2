use std::sync::Arc;

use folio_core::Message;
use folio_session::{ChatSession, FileKeyValueStore, HistoryStore, KeyValueStore};
use tempfile::TempDir;

fn conversation(question: &str) -> ChatSession {
    let mut session = ChatSession::new();
    session.push(Message::assistant("Hi! I'm the portfolio assistant."));
    session.push(Message::user(question));
    session.push(Message::assistant("Here you go."));
    session
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let session = conversation("Tell me about his projects");

    {
        let kv = Arc::new(FileKeyValueStore::new(temp_dir.path()).await.unwrap());
        let history = HistoryStore::new(kv);
        history.archive(&session).await.unwrap();
    }

    let kv = Arc::new(FileKeyValueStore::new(temp_dir.path()).await.unwrap());
    let history = HistoryStore::new(kv);
    let entries = history.list().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].session_id, session.id);
    assert_eq!(entries[0].title, "Tell me about his projects");
    assert_eq!(entries[0].messages, session.messages);
}

#[tokio::test]
async fn test_persisted_format_is_json_array() {
    let temp_dir = TempDir::new().unwrap();
    let kv = Arc::new(FileKeyValueStore::new(temp_dir.path()).await.unwrap());
    let history = HistoryStore::new(kv.clone());
    history.archive(&conversation("hello")).await.unwrap();

    let raw = kv.get("chat_history").await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["title"], "hello");
    assert_eq!(array[0]["messages"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_truncated_file_reads_as_empty() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("chat_history.json"), "[{\"session_id\": ").unwrap();

    let kv = Arc::new(FileKeyValueStore::new(temp_dir.path()).await.unwrap());
    let history = HistoryStore::new(kv);
    assert!(history.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_utf8_file_reads_as_empty_and_recovers() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("chat_history.json");
    std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let kv = Arc::new(FileKeyValueStore::new(temp_dir.path()).await.unwrap());
    let history = HistoryStore::new(kv);
    assert!(history.list().await.unwrap().is_empty());

    let session = conversation("still here?");
    assert!(history.archive(&session).await.unwrap());
    let entries = history.list().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].session_id, session.id);
    assert!(std::str::from_utf8(&std::fs::read(&path).unwrap()).is_ok());
}
