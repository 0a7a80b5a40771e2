use async_trait::async_trait;
use folio_core::chat::{ChatReply, ChatRequest};

use crate::error::Result;

/// Anything that can answer a transcript with a single reply.
///
/// Implementations make exactly one attempt per call. Retrying and falling
/// back are the caller's business.
#[async_trait]
pub trait ResponseClient: Send + Sync {
    /// Short identifier used in logs
    fn client_id(&self) -> &str;

    async fn ask(&self, request: ChatRequest) -> Result<ChatReply>;
}
