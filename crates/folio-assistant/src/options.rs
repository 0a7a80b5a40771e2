use std::time::Duration;

use folio_responder::{quick_questions, welcome_message, DEFAULT_OWNER};

/// How long a copied message keeps its "copied" flag
pub const DEFAULT_COPIED_FLASH: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantOptions {
    /// First assistant message of every session
    pub greeting: String,
    /// Starter prompts shown while a session is still empty
    pub quick_questions: Vec<String>,
    pub copied_flash: Duration,
    /// Artificial wait before a rule-based reply in offline mode
    pub offline_delay: Option<Duration>,
}

impl AssistantOptions {
    pub fn for_owner(owner: &str) -> Self {
        Self {
            greeting: welcome_message(owner),
            quick_questions: quick_questions(owner),
            copied_flash: DEFAULT_COPIED_FLASH,
            offline_delay: None,
        }
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    pub fn with_quick_questions(mut self, questions: Vec<String>) -> Self {
        self.quick_questions = questions;
        self
    }

    pub fn with_copied_flash(mut self, flash: Duration) -> Self {
        self.copied_flash = flash;
        self
    }

    pub fn with_offline_delay(mut self, delay: Duration) -> Self {
        self.offline_delay = Some(delay);
        self
    }
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self::for_owner(DEFAULT_OWNER)
    }
}
