//! Messaging workflow service.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use tradepost_core::access::{authorize, Action, Principal};
use tradepost_core::error::{MarketError, Result};
use tradepost_core::message::{Message, MessageRepository};
use tradepost_core::user::{UserProfile, UserRepository};

/// Orchestrates member-to-member messages.
pub struct MessageService {
    /// Repository for message documents
    message_repository: Arc<dyn MessageRepository>,
    /// Repository for profiles, read to resolve receiver names
    user_repository: Arc<dyn UserRepository>,
}

impl MessageService {
    /// Creates a new `MessageService`.
    ///
    /// # Arguments
    ///
    /// * `message_repository` - Repository for message documents
    /// * `user_repository` - Repository for profiles
    pub fn new(
        message_repository: Arc<dyn MessageRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            message_repository,
            user_repository,
        }
    }

    /// Sends a message to `receiver_id`.
    ///
    /// Visitors may write too: a missing sender is recorded under the
    /// guest identity. Names are denormalized into the document at send
    /// time.
    pub async fn send(
        &self,
        sender: Option<&UserProfile>,
        receiver_id: &str,
        subject: &str,
        content: &str,
    ) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(MarketError::validation("message content cannot be empty"));
        }

        let receiver = self
            .user_repository
            .find_by_id(receiver_id)
            .await?
            .ok_or_else(|| MarketError::not_found("User", receiver_id))?;

        let (sender_id, sender_name) = match sender {
            Some(profile) => (profile.id.clone(), profile.name.clone()),
            None => ("guest".to_string(), "Guest".to_string()),
        };

        let message = Message {
            id: Uuid::new_v4().to_string(),
            sender_id,
            receiver_id: receiver.id.clone(),
            sender_name,
            receiver_name: receiver.name.clone(),
            subject: subject.to_string(),
            content: content.to_string(),
            sent_at: Utc::now(),
            is_read: false,
        };

        self.message_repository.save(&message).await?;
        tracing::debug!("[MessageService] message {} sent to {}", message.id, receiver.id);
        Ok(message)
    }

    /// Flags a message as read. Only its receiver may do so.
    pub async fn mark_read(&self, actor: &Principal, message_id: &str) -> Result<()> {
        let message = self
            .message_repository
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| MarketError::not_found("Message", message_id))?;

        authorize(
            actor,
            &Action::MarkMessageRead {
                receiver_id: &message.receiver_id,
            },
        )?;

        self.message_repository.mark_read(message_id).await
    }
}
