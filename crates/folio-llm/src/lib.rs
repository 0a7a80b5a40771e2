pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transformer;

pub use client::ResponseClient;
pub use config::{AuthConfig, RemoteClientConfig};
pub use error::{ConversionError, LLMError, Result};
pub use http::HttpResponseClient;
pub use transformer::{HostedSchema, RelaySchema, SchemaTransformer};
