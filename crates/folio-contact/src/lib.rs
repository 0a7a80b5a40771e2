//! Contact form boundary: field validation, the relay call and the
//! auto-resetting submit status.

pub mod error;
pub mod form;
pub mod relay;
pub mod status;

pub use error::{ContactError, Result};
pub use form::{is_valid_email, ContactForm, Field, FieldError};
pub use relay::{ContactRelay, RelayConfig, DEFAULT_FROM_NAME, DEFAULT_RELAY_ENDPOINT};
pub use status::{StatusBoard, SubmitStatus, DEFAULT_STATUS_RESET};
