use std::fmt;

use folio_core::{Message, MessageId, ReplySource};
use serde::{Deserialize, Serialize};

/// Widget state, always derived from the visibility flag and the message log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetState {
    Closed,
    OpenEmpty,
    OpenActive,
}

impl fmt::Display for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetState::Closed => write!(f, "closed"),
            WidgetState::OpenEmpty => write!(f, "open-empty"),
            WidgetState::OpenActive => write!(f, "open-active"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Like,
    Dislike,
}

/// Why an operation was refused. Refusals leave all state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    EmptyInput,
    /// A reply is already in flight
    Pending,
    UnknownMessage(MessageId),
    /// The message exists but the operation does not apply to it
    InvalidTarget,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::EmptyInput => write!(f, "message is empty"),
            RejectReason::Pending => write!(f, "a reply is still pending"),
            RejectReason::UnknownMessage(id) => write!(f, "no message with id {}", id),
            RejectReason::InvalidTarget => write!(f, "operation does not apply to this message"),
        }
    }
}

/// The assistant message appended by a submit or retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyReceipt {
    pub message_id: MessageId,
    pub source: ReplySource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Replied(ReplyReceipt),
    Rejected(RejectReason),
    /// The session was reset, ended or replaced before the reply arrived
    Discarded,
}

impl SubmitOutcome {
    pub fn receipt(&self) -> Option<&ReplyReceipt> {
        match self {
            SubmitOutcome::Replied(receipt) => Some(receipt),
            _ => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, SubmitOutcome::Rejected(_))
    }
}

/// A message as a front end shows it
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub message: Message,
    pub reaction: Option<Reaction>,
    pub copied: bool,
}

/// Read-only view of the whole widget
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: WidgetState,
    pub pending: bool,
    pub session_id: Option<String>,
    pub messages: Vec<MessageView>,
    pub menu_open: bool,
    pub history_open: bool,
}
