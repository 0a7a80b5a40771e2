//! Chat widget controller: session lifecycle, remote replies with rule-based
//! fallback, reactions, copy and history.

pub mod assistant;
pub mod error;
pub mod options;
pub mod state;

pub use assistant::Assistant;
pub use error::{AssistantError, Result};
pub use options::{AssistantOptions, DEFAULT_COPIED_FLASH};
pub use state::{
    MessageView, Reaction, RejectReason, ReplyReceipt, Snapshot, SubmitOutcome, WidgetState,
};
