use std::collections::HashMap;
use std::sync::Arc;

use folio_core::{ChatRequest, Message, MessageId, ReplySource};
use folio_llm::ResponseClient;
use folio_markup::MarkupRenderer;
use folio_responder::Responder;
use folio_session::{ChatSession, HistoryEntry, HistoryStore, MemoryKeyValueStore};
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::options::AssistantOptions;
use crate::state::{
    MessageView, Reaction, RejectReason, ReplyReceipt, Snapshot, SubmitOutcome, WidgetState,
};

/// The live session plus the per-message UI state that never leaves memory
struct ActiveSession {
    session: ChatSession,
    reactions: HashMap<MessageId, Reaction>,
    copied: Option<(MessageId, Instant)>,
}

impl ActiveSession {
    fn new(session: ChatSession) -> Self {
        Self {
            session,
            reactions: HashMap::new(),
            copied: None,
        }
    }

    fn index_of(&self, message_id: &str) -> Option<usize> {
        self.session.messages.iter().position(|m| m.id == message_id)
    }
}

#[derive(Default)]
struct Inner {
    open: bool,
    active: Option<ActiveSession>,
    pending: bool,
    /// Bumped whenever the active session is torn down; replies carry the
    /// value they started under and are dropped on mismatch.
    generation: u64,
    menu_open: bool,
    history_open: bool,
}

impl Inner {
    fn state(&self) -> WidgetState {
        if !self.open {
            return WidgetState::Closed;
        }
        match &self.active {
            Some(active) if active.session.has_user_message() => WidgetState::OpenActive,
            _ => WidgetState::OpenEmpty,
        }
    }

    fn ensure_session(&mut self, greeting: &str) -> &mut ActiveSession {
        let active = self
            .active
            .get_or_insert_with(|| ActiveSession::new(ChatSession::new()));
        if active.session.messages.is_empty() {
            active.session.push(Message::assistant(greeting));
        }
        active
    }

    /// Drop the active session and everything waiting on it
    fn reset(&mut self) -> Option<ChatSession> {
        self.generation += 1;
        self.pending = false;
        self.menu_open = false;
        self.history_open = false;
        self.active.take().map(|a| a.session)
    }

    fn active_mut(&mut self, message_id: &str) -> Result<&mut ActiveSession, RejectReason> {
        self.active
            .as_mut()
            .filter(|a| a.index_of(message_id).is_some())
            .ok_or_else(|| RejectReason::UnknownMessage(message_id.to_string()))
    }
}

/// Controller behind the chat widget.
///
/// All state sits behind one mutex that is never held across an `.await`.
/// The pending flag is the only thing serializing submit and retry: a second
/// request while one is in flight is refused, not queued.
pub struct Assistant {
    inner: Mutex<Inner>,
    client: Option<Arc<dyn ResponseClient>>,
    responder: Responder,
    history: Arc<HistoryStore>,
    renderer: MarkupRenderer,
    options: AssistantOptions,
}

impl Assistant {
    /// Offline assistant with in-memory history
    pub fn new(responder: Responder) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            client: None,
            responder,
            history: Arc::new(HistoryStore::new(Arc::new(MemoryKeyValueStore::new()))),
            renderer: MarkupRenderer::default(),
            options: AssistantOptions::default(),
        }
    }

    pub fn with_client(mut self, client: Arc<dyn ResponseClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_history(mut self, history: Arc<HistoryStore>) -> Self {
        self.history = history;
        self
    }

    pub fn with_renderer(mut self, renderer: MarkupRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_options(mut self, options: AssistantOptions) -> Self {
        self.options = options;
        self
    }

    /// No remote client: every reply comes from the rule table
    pub fn is_offline(&self) -> bool {
        self.client.is_none()
    }

    pub fn options(&self) -> &AssistantOptions {
        &self.options
    }

    pub fn renderer(&self) -> &MarkupRenderer {
        &self.renderer
    }

    /// Show the widget. The first open of a session appends the greeting.
    pub fn open(&self) {
        let mut inner = self.inner.lock();
        inner.open = true;
        let active = inner.ensure_session(&self.options.greeting);
        debug!("Widget opened: session={}", active.session.id);
    }

    /// Hide the widget. The session and any in-flight reply are kept.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.open = false;
        inner.menu_open = false;
        inner.history_open = false;
        debug!("Widget closed");
    }

    pub fn state(&self) -> WidgetState {
        self.inner.lock().state()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.lock().pending
    }

    pub fn session_id(&self) -> Option<String> {
        self.inner
            .lock()
            .active
            .as_ref()
            .map(|a| a.session.id.clone())
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner
            .lock()
            .active
            .as_ref()
            .map(|a| a.session.messages.clone())
            .unwrap_or_default()
    }

    pub fn set_menu_open(&self, open: bool) {
        self.inner.lock().menu_open = open;
    }

    pub fn toggle_menu(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.menu_open = !inner.menu_open;
        inner.menu_open
    }

    pub fn set_history_open(&self, open: bool) {
        self.inner.lock().history_open = open;
    }

    pub fn toggle_history(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.history_open = !inner.history_open;
        inner.history_open
    }

    /// Append a user message and wait for exactly one assistant reply.
    ///
    /// A closed widget is opened first. If the remote call fails the rule
    /// table answers the last user message, so pending always clears.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Rejected(RejectReason::EmptyInput);
        }

        let (request, generation) = {
            let mut inner = self.inner.lock();
            if inner.pending {
                debug!("Submit rejected: reply pending");
                return SubmitOutcome::Rejected(RejectReason::Pending);
            }
            inner.open = true;
            let active = inner.ensure_session(&self.options.greeting);
            active.session.push(Message::user(text));
            let request = transcript(&active.session);
            inner.pending = true;
            (request, inner.generation)
        };

        self.complete(request, generation).await
    }

    /// Regenerate the assistant message at `index`.
    ///
    /// The target must be an assistant message directly preceded by a user
    /// message. The log is cut just before the target and one replacement is
    /// appended; the user message is not sent again as a new entry.
    pub async fn retry(&self, index: usize) -> SubmitOutcome {
        let (request, generation) = {
            let mut inner = self.inner.lock();
            if inner.pending {
                return SubmitOutcome::Rejected(RejectReason::Pending);
            }
            let Some(active) = inner.active.as_mut() else {
                return SubmitOutcome::Rejected(RejectReason::InvalidTarget);
            };

            let messages = &active.session.messages;
            let valid = index > 0
                && index < messages.len()
                && messages[index].is_assistant()
                && messages[index - 1].is_user();
            if !valid {
                return SubmitOutcome::Rejected(RejectReason::InvalidTarget);
            }

            let removed: Vec<MessageId> = active
                .session
                .messages
                .drain(index..)
                .map(|m| m.id)
                .collect();
            for id in &removed {
                active.reactions.remove(id);
            }
            if matches!(&active.copied, Some((id, _)) if removed.contains(id)) {
                active.copied = None;
            }
            debug!("Retrying from index {} ({} messages dropped)", index, removed.len());

            let request = transcript(&active.session);
            inner.pending = true;
            (request, inner.generation)
        };

        self.complete(request, generation).await
    }

    /// [`retry`](Self::retry) addressed by message id
    pub async fn retry_message(&self, message_id: &str) -> SubmitOutcome {
        let index = self
            .inner
            .lock()
            .active
            .as_ref()
            .and_then(|a| a.index_of(message_id));
        match index {
            Some(index) => self.retry(index).await,
            None => SubmitOutcome::Rejected(RejectReason::UnknownMessage(message_id.to_string())),
        }
    }

    async fn complete(&self, request: ChatRequest, generation: u64) -> SubmitOutcome {
        let session_id = request.conversation_id.clone().unwrap_or_default();
        let span = info_span!("reply", session_id = %session_id, generation);
        let (text, source) = self.fetch_reply(request).instrument(span).await;

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            debug!(
                "Discarding reply for torn-down session {} (generation {} != {})",
                session_id, generation, inner.generation
            );
            return SubmitOutcome::Discarded;
        }
        inner.pending = false;

        let Some(active) = inner.active.as_mut() else {
            return SubmitOutcome::Discarded;
        };
        let message = Message::assistant(text);
        let message_id = message.id.clone();
        active.session.push(message);
        info!(
            "Reply appended: session={}, source={}, messages={}",
            active.session.id,
            source,
            active.session.messages.len()
        );

        SubmitOutcome::Replied(ReplyReceipt { message_id, source })
    }

    async fn fetch_reply(&self, request: ChatRequest) -> (String, ReplySource) {
        let last_user = request.last_user_content().unwrap_or_default().to_string();

        let Some(client) = &self.client else {
            if let Some(delay) = self.options.offline_delay {
                tokio::time::sleep(delay).await;
            }
            let reply = self.responder.respond(&last_user);
            debug!("Offline reply from {} bucket", reply.topic);
            return (reply.text, ReplySource::Rules);
        };

        match client.ask(request).await {
            Ok(reply) => (reply.text, ReplySource::Remote),
            Err(e) => {
                warn!(
                    "Remote reply from {} failed, using rule-based fallback: {}",
                    client.client_id(),
                    e
                );
                let reply = self.responder.respond(&last_user);
                (reply.text, ReplySource::Fallback)
            }
        }
    }

    /// Archive the current session if it has more than the greeting, then
    /// start a fresh one with a new id and greeting. Returns whether anything
    /// was archived.
    pub async fn new_chat(&self) -> bool {
        let previous = {
            let mut inner = self.inner.lock();
            let previous = inner.reset();
            let active = inner.ensure_session(&self.options.greeting);
            info!("New chat session: {}", active.session.id);
            previous
        };
        self.archive(previous).await
    }

    /// Archive like [`new_chat`](Self::new_chat), then drop the session and
    /// close the widget.
    pub async fn end_chat(&self) -> bool {
        let previous = {
            let mut inner = self.inner.lock();
            let previous = inner.reset();
            inner.open = false;
            info!("Chat ended");
            previous
        };
        self.archive(previous).await
    }

    /// Replace the active session with a history snapshot and open the widget.
    ///
    /// A non-empty active session is archived, so nothing is lost by
    /// switching. The restored session keeps the entry's id; when that is the
    /// session already open, its live copy wins over the stored one. A reply
    /// still in flight is discarded before the archive starts.
    pub async fn load_from_history(&self, session_id: &str) -> bool {
        let entry = match self.history.load(session_id).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("History entry not found: {}", session_id);
                return false;
            }
            Err(e) => {
                warn!("Failed to read history entry {}: {}", session_id, e);
                return false;
            }
        };

        let previous = {
            let mut inner = self.inner.lock();
            let previous = inner.reset();
            let restored = match &previous {
                Some(session) if session.id == entry.session_id => session.clone(),
                _ => ChatSession::from_entry(&entry),
            };
            info!(
                "Loaded session {} from history ({} messages)",
                restored.id,
                restored.messages.len()
            );
            inner.active = Some(ActiveSession::new(restored));
            inner.open = true;
            previous
        };
        self.archive(previous).await;
        true
    }

    async fn archive(&self, session: Option<ChatSession>) -> bool {
        let Some(session) = session else {
            return false;
        };
        match self.history.archive(&session).await {
            Ok(archived) => archived,
            Err(e) => {
                warn!("Failed to archive session {}: {}", session.id, e);
                false
            }
        }
    }

    /// Toggle a reaction on an assistant message. Like and dislike exclude
    /// each other; repeating the current one clears it. Returns the reaction
    /// now in effect.
    pub fn react(&self, message_id: &str, reaction: Reaction) -> Result<Option<Reaction>, RejectReason> {
        let mut inner = self.inner.lock();
        let active = inner.active_mut(message_id)?;

        if !active
            .session
            .message(message_id)
            .is_some_and(Message::is_assistant)
        {
            return Err(RejectReason::InvalidTarget);
        }

        let next = match active.reactions.get(message_id) {
            Some(current) if *current == reaction => None,
            _ => Some(reaction),
        };
        match next {
            Some(reaction) => active.reactions.insert(message_id.to_string(), reaction),
            None => active.reactions.remove(message_id),
        };
        Ok(next)
    }

    pub fn reaction(&self, message_id: &str) -> Option<Reaction> {
        self.inner
            .lock()
            .active
            .as_ref()
            .and_then(|a| a.reactions.get(message_id).copied())
    }

    /// Text for the clipboard: assistant messages with markup stripped, user
    /// messages verbatim. Raises the message's "copied" flag.
    pub fn copy(&self, message_id: &str) -> Result<String, RejectReason> {
        let mut inner = self.inner.lock();
        let active = inner.active_mut(message_id)?;

        let text = match active.session.message(message_id) {
            Some(message) if message.is_assistant() => {
                self.renderer.render(&message.content).plain_text()
            }
            Some(message) => message.content.clone(),
            None => return Err(RejectReason::UnknownMessage(message_id.to_string())),
        };
        active.copied = Some((message_id.to_string(), Instant::now()));
        Ok(text)
    }

    pub fn is_copied(&self, message_id: &str) -> bool {
        let inner = self.inner.lock();
        inner
            .active
            .as_ref()
            .and_then(|a| a.copied.as_ref())
            .is_some_and(|(id, at)| id == message_id && at.elapsed() < self.options.copied_flash)
    }

    pub fn clear_copied(&self) {
        if let Some(active) = self.inner.lock().active.as_mut() {
            active.copied = None;
        }
    }

    /// Starter prompts, offered while the session holds at most the greeting
    /// and nothing is pending
    pub fn quick_questions(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let fresh = inner
            .active
            .as_ref()
            .map_or(true, |a| a.session.messages.len() <= 1);
        if fresh && !inner.pending {
            self.options.quick_questions.clone()
        } else {
            Vec::new()
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock();
        let messages = inner
            .active
            .as_ref()
            .map(|active| {
                let copied = active
                    .copied
                    .as_ref()
                    .filter(|(_, at)| at.elapsed() < self.options.copied_flash)
                    .map(|(id, _)| id.as_str());
                active
                    .session
                    .messages
                    .iter()
                    .map(|m| MessageView {
                        message: m.clone(),
                        reaction: active.reactions.get(&m.id).copied(),
                        copied: copied == Some(m.id.as_str()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Snapshot {
            state: inner.state(),
            pending: inner.pending,
            session_id: inner.active.as_ref().map(|a| a.session.id.clone()),
            messages,
            menu_open: inner.menu_open,
            history_open: inner.history_open,
        }
    }

    /// Archived sessions, most recent first. Storage failures read as empty.
    pub async fn history(&self) -> Vec<HistoryEntry> {
        match self.history.list().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read history: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn clear_history(&self) -> bool {
        match self.history.clear().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to clear history: {}", e);
                false
            }
        }
    }

    pub async fn remove_history_entry(&self, session_id: &str) -> bool {
        match self.history.remove(session_id).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Failed to remove history entry {}: {}", session_id, e);
                false
            }
        }
    }
}

fn transcript(session: &ChatSession) -> ChatRequest {
    ChatRequest::from_messages(&session.messages).with_conversation_id(session.id.clone())
}
