//! Keyword-routed canned replies, used when no remote assistant is reachable.

pub mod builtin;
pub mod error;
pub mod keyword;
pub mod responder;
pub mod table;

pub use builtin::{default_table_config, quick_questions, welcome_message, DEFAULT_OWNER};
pub use error::{ResponderError, ResponderResult};
pub use keyword::Keyword;
pub use responder::{Reply, Responder};
pub use table::{BucketConfig, ResponseTable, ResponseTableConfig, Topic};
