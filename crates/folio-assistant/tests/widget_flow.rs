use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use folio_assistant::{Assistant, ReplyReceipt, SubmitOutcome, WidgetState};
use folio_core::{ChatReply, ChatRequest, Message, ReplySource};
use folio_llm::{LLMError, ResponseClient};
use folio_responder::Responder;
use folio_session::{
    ChatSession, FileKeyValueStore, HistoryStore, KeyValueStore, MemoryKeyValueStore,
    StorageError, StorageResult,
};
use tempfile::TempDir;
use tokio::sync::Notify;

/// Echoes the transcript length so tests can see what was sent
struct EchoClient;

#[async_trait]
impl ResponseClient for EchoClient {
    fn client_id(&self) -> &str {
        "echo"
    }

    async fn ask(&self, request: ChatRequest) -> Result<ChatReply, LLMError> {
        Ok(ChatReply::new(format!(
            "{} messages, last: {}",
            request.messages.len(),
            request.last_user_content().unwrap_or_default()
        )))
    }
}

/// Storage whose every call fails
struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::other("disk unavailable"))
    }

    async fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::other("disk unavailable"))
    }

    async fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::other("disk unavailable"))
    }
}

/// Replies only once the shared gate opens
struct GatedClient {
    gate: Arc<Notify>,
}

#[async_trait]
impl ResponseClient for GatedClient {
    fn client_id(&self) -> &str {
        "gated"
    }

    async fn ask(&self, _request: ChatRequest) -> Result<ChatReply, LLMError> {
        self.gate.notified().await;
        Ok(ChatReply::new("late reply"))
    }
}

/// In-memory storage that, once armed, opens the gate mid-write and lets
/// other tasks run before the write lands
struct SlowStore {
    inner: MemoryKeyValueStore,
    gate: Arc<Notify>,
    armed: AtomicBool,
}

#[async_trait]
impl KeyValueStore for SlowStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.gate.notify_one();
            for _ in 0..16 {
                tokio::task::yield_now().await;
            }
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.remove(key).await
    }
}

async fn file_history(dir: &TempDir) -> Arc<HistoryStore> {
    let kv = Arc::new(FileKeyValueStore::new(dir.path()).await.unwrap());
    Arc::new(HistoryStore::new(kv))
}

#[tokio::test]
async fn test_open_hello_new_chat_scenario() {
    let dir = TempDir::new().unwrap();
    let history = file_history(&dir).await;
    let assistant = Assistant::new(Responder::default().with_seed(11))
        .with_client(Arc::new(EchoClient))
        .with_history(history.clone());

    assistant.open();
    assert_eq!(assistant.messages().len(), 1);
    assert_eq!(assistant.state(), WidgetState::OpenEmpty);
    let first_session = assistant.session_id().unwrap();

    let outcome = assistant.submit("hello").await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Replied(ReplyReceipt {
            source: ReplySource::Remote,
            ..
        })
    ));
    let messages = assistant.messages();
    assert_eq!(messages.len(), 3);
    // greeting and the new user message both travel in the transcript
    assert_eq!(messages[2].content, "2 messages, last: hello");

    assert!(assistant.new_chat().await);
    assert_eq!(assistant.messages().len(), 1);
    assert_eq!(assistant.state(), WidgetState::OpenEmpty);
    assert_ne!(assistant.session_id().unwrap(), first_session);

    let entries = assistant.history().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].session_id, first_session);
    assert_eq!(entries[0].title, "hello");
    assert_eq!(entries[0].messages, messages);
}

#[tokio::test]
async fn test_load_from_history_archives_current_first() {
    let dir = TempDir::new().unwrap();
    let assistant = Assistant::new(Responder::default())
        .with_history(file_history(&dir).await);

    assistant.submit("first conversation").await;
    let first = assistant.session_id().unwrap();
    assistant.new_chat().await;

    assistant.submit("second conversation").await;
    let second = assistant.session_id().unwrap();
    assistant.close();

    assert!(assistant.load_from_history(&first).await);
    assert_eq!(assistant.session_id().as_deref(), Some(first.as_str()));
    assert_eq!(assistant.state(), WidgetState::OpenActive);
    assert_eq!(assistant.messages()[1].content, "first conversation");

    let ids: Vec<String> = assistant
        .history()
        .await
        .into_iter()
        .map(|e| e.session_id)
        .collect();
    assert_eq!(ids, vec![second.clone(), first.clone()]);

    // continuing a restored session and switching away updates its entry
    assistant.submit("more").await;
    assert!(assistant.load_from_history(&second).await);
    let restored = assistant.history().await;
    assert_eq!(restored[0].session_id, first);
    assert_eq!(restored[0].messages.len(), 5);

    assert!(!assistant.load_from_history("missing").await);
    assert_eq!(assistant.session_id().as_deref(), Some(second.as_str()));
}

#[tokio::test]
async fn test_history_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let assistant = Assistant::new(Responder::default())
            .with_history(file_history(&dir).await);
        assistant.submit("remember me").await;
        assistant.end_chat().await;
    }

    let assistant = Assistant::new(Responder::default())
        .with_history(file_history(&dir).await);
    let entries = assistant.history().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "remember me");

    assert!(assistant.remove_history_entry(&entries[0].session_id).await);
    assert!(assistant.history().await.is_empty());
}

#[tokio::test]
async fn test_storage_failure_does_not_block_chat() {
    let history = Arc::new(HistoryStore::new(Arc::new(BrokenStore)));
    let assistant = Assistant::new(Responder::default()).with_history(history);

    assistant.submit("hello").await;
    assert!(!assistant.new_chat().await);
    assert_eq!(assistant.messages().len(), 1);

    assert!(assistant.history().await.is_empty());
    assert!(!assistant.clear_history().await);
    assert!(!assistant.load_from_history("anything").await);

    let outcome = assistant.submit("still works?").await;
    assert!(outcome.receipt().is_some());
}

#[tokio::test]
async fn test_clear_history() {
    let assistant = Assistant::new(Responder::default());
    for question in ["a", "b", "c"] {
        assistant.submit(question).await;
        assistant.new_chat().await;
    }
    assert_eq!(assistant.history().await.len(), 3);
    assert!(assistant.clear_history().await);
    assert!(assistant.history().await.is_empty());
}

#[tokio::test]
async fn test_load_from_history_discards_reply_landing_during_archive() {
    let gate = Arc::new(Notify::new());
    let store = Arc::new(SlowStore {
        inner: MemoryKeyValueStore::new(),
        gate: gate.clone(),
        armed: AtomicBool::new(false),
    });
    let history = Arc::new(HistoryStore::new(store.clone()));

    let mut saved = ChatSession::new();
    saved.push(Message::assistant("greeting"));
    saved.push(Message::user("older question"));
    saved.push(Message::assistant("older answer"));
    assert!(history.archive(&saved).await.unwrap());

    let assistant = Arc::new(
        Assistant::new(Responder::default())
            .with_client(Arc::new(GatedClient { gate }))
            .with_history(history),
    );
    assistant.open();
    let current = assistant.session_id().unwrap();

    let pending = {
        let assistant = assistant.clone();
        tokio::spawn(async move { assistant.submit("new question").await })
    };
    while !assistant.is_pending() {
        tokio::task::yield_now().await;
    }

    store.armed.store(true, Ordering::SeqCst);
    assert!(assistant.load_from_history(&saved.id).await);
    assert_eq!(pending.await.unwrap(), SubmitOutcome::Discarded);

    assert!(!assistant.is_pending());
    assert_eq!(assistant.session_id().as_deref(), Some(saved.id.as_str()));
    assert_eq!(assistant.messages(), saved.messages);

    let entries = assistant.history().await;
    let archived = entries
        .iter()
        .find(|e| e.session_id == current)
        .expect("current session archived");
    let contents: Vec<&str> = archived.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec![assistant.options().greeting.as_str(), "new question"]);
}
