//! Direct message domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A member-to-member message as stored in the `messages` collection.
///
/// Names are denormalized at send time so the inbox stays readable after a
/// sender deletes their account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub sender_name: String,
    pub receiver_name: String,
    pub subject: String,
    pub content: String,
    #[serde(rename = "timestamp")]
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Message {
    pub fn is_unread_for(&self, user_id: &str) -> bool {
        self.receiver_id == user_id && !self.is_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_uses_timestamp_key() {
        let message = Message {
            id: "m-1".to_string(),
            sender_id: "u-1".to_string(),
            receiver_id: "u-2".to_string(),
            sender_name: "Dana".to_string(),
            receiver_name: "Noa".to_string(),
            subject: "Interested in: Headshots for copy".to_string(),
            content: "Still available?".to_string(),
            sent_at: Utc::now(),
            is_read: false,
        };

        let json = serde_json::to_value(&message).unwrap();
        assert!(json.get("timestamp").is_some());
        assert!(json.get("sentAt").is_none());
        assert_eq!(json["isRead"], false);
    }

    #[test]
    fn test_unread_counts_only_for_receiver() {
        let mut message = Message {
            id: "m-1".to_string(),
            sender_id: "u-1".to_string(),
            receiver_id: "u-2".to_string(),
            sender_name: "Dana".to_string(),
            receiver_name: "Noa".to_string(),
            subject: String::new(),
            content: String::new(),
            sent_at: Utc::now(),
            is_read: false,
        };

        assert!(message.is_unread_for("u-2"));
        assert!(!message.is_unread_for("u-1"));

        message.is_read = true;
        assert!(!message.is_unread_for("u-2"));
    }
}
