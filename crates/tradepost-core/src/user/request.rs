//! Account registration request model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ExpertiseLevel, Role, UserProfile};

/// Request to register a new member account.
///
/// The credential part is handed to the auth collaborator; the rest seeds
/// the initial profile document. Everything beyond name and credentials is
/// optional and falls back to new-member defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Display name (required)
    pub name: String,

    /// Login email (required)
    pub email: String,

    /// Login password, forwarded to the auth collaborator as-is
    pub password: String,

    /// Custom avatar; defaults to a generated placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_images: Option<Vec<String>>,

    /// Defaults to mid-level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise: Option<ExpertiseLevel>,

    /// Defaults to the catch-all "General" field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_field: Option<String>,

    #[serde(default)]
    pub interests: BTreeSet<String>,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Registration {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            avatar_url: None,
            portfolio_url: None,
            portfolio_images: None,
            expertise: None,
            main_field: None,
            interests: BTreeSet::new(),
        }
    }

    /// Validate the request and return errors if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required and cannot be empty".to_string());
        }

        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err("A valid email address is required".to_string());
        }

        if self.password.len() < 6 {
            return Err("Password must be at least 6 characters long".to_string());
        }

        Ok(())
    }

    /// Build the initial profile document for a freshly issued account id.
    pub fn into_profile(
        self,
        id: impl Into<String>,
        role: Role,
        joined_at: DateTime<Utc>,
    ) -> UserProfile {
        let avatar_url = self.avatar_url.unwrap_or_else(|| {
            format!(
                "https://ui-avatars.com/api/?name={}&background=random",
                self.name.replace(' ', "+")
            )
        });

        UserProfile {
            id: id.into(),
            name: self.name,
            email: Some(self.email),
            role,
            avatar_url,
            portfolio_url: self.portfolio_url.unwrap_or_default(),
            portfolio_images: self.portfolio_images.unwrap_or_default(),
            expertise: self.expertise.unwrap_or_default(),
            main_field: self
                .main_field
                .unwrap_or_else(|| "General".to_string()),
            interests: self.interests,
            bio: None,
            joined_at,
            pending_update: None,
        }
    }
}
