use async_trait::async_trait;
use serde::Serialize;

use crate::{
    document::Document,
    domain::RoutingMeta,
    update::Update,
    Result,
};

/// Ordered source of inbound updates.
///
/// Implementations may block (long-poll) inside `next_update`; that call is the
/// only suspension point of the relay loop.
#[async_trait]
pub trait UpdateFeed: Send {
    /// Platform value carried alongside each update and rendered into the document.
    type Payload: Serialize + Send + Sync;

    /// Next update in arrival order, or `None` once the feed is closed.
    async fn next_update(&mut self) -> Result<Option<Update<Self::Payload>>>;
}

/// Sends a file attachment into a conversation.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn send_document(&self, route: RoutingMeta, document: Document) -> Result<()>;
}
