//! Message repository trait.

use super::model::Message;
use crate::error::Result;

/// An abstract repository for message documents.
#[async_trait::async_trait]
pub trait MessageRepository: Send + Sync {
    /// Retrieves a single message by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Message>>;

    /// Retrieves all messages from storage.
    async fn list_all(&self) -> Result<Vec<Message>>;

    /// Creates or fully replaces a message document.
    async fn save(&self, message: &Message) -> Result<()>;

    /// Flags a message as read.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Flag written, or already set
    /// - `Err(MarketError::NotFound)`: No document under that id
    async fn mark_read(&self, id: &str) -> Result<()>;

    /// Deletes the message document. Deleting a missing document is a no-op.
    async fn delete(&self, id: &str) -> Result<()>;
}
