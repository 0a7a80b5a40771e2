use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// How long a success or error outcome stays visible
pub const DEFAULT_STATUS_RESET: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    Idle,
    Success,
    Error,
}

impl SubmitStatus {
    /// Banner text shown for the status, if any
    pub fn banner(&self) -> Option<&'static str> {
        match self {
            SubmitStatus::Idle => None,
            SubmitStatus::Success => Some("Thank you for your message! I'll get back to you soon."),
            SubmitStatus::Error => {
                Some("Sorry, there was an error sending your message. Please try again.")
            }
        }
    }
}

impl fmt::Display for SubmitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitStatus::Idle => write!(f, "idle"),
            SubmitStatus::Success => write!(f, "success"),
            SubmitStatus::Error => write!(f, "error"),
        }
    }
}

/// Tri-state submit status that falls back to idle a fixed time after the
/// last recorded outcome
#[derive(Debug, Clone)]
pub struct StatusBoard {
    last: Option<(SubmitStatus, Instant)>,
    reset_after: Duration,
}

impl StatusBoard {
    pub fn new(reset_after: Duration) -> Self {
        Self {
            last: None,
            reset_after,
        }
    }

    pub fn record(&mut self, status: SubmitStatus) {
        self.last = Some((status, Instant::now()));
    }

    pub fn record_result<T, E>(&mut self, result: &std::result::Result<T, E>) -> SubmitStatus {
        let status = if result.is_ok() {
            SubmitStatus::Success
        } else {
            SubmitStatus::Error
        };
        self.record(status);
        status
    }

    pub fn current(&self) -> SubmitStatus {
        match self.last {
            Some((status, at)) if at.elapsed() < self.reset_after => status,
            _ => SubmitStatus::Idle,
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_RESET)
    }
}
