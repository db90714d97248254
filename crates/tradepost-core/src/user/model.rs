//! User profile domain model.
//!
//! Contains the canonical member record plus the staged-patch type used by
//! the profile update approval workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::Display;

/// Access role attached to a member account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Self-declared experience level, used for display and ad targeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExpertiseLevel {
    Junior,
    #[default]
    Mid,
    Senior,
    Agency,
}

/// A member profile as stored in the `users` collection.
///
/// `pending_update`, when present, is a staged patch awaiting admin
/// approval. Canonical fields remain the single source of truth until an
/// admin merges the patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable identifier issued by the auth collaborator. Never reassigned.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub avatar_url: String,
    pub portfolio_url: String,
    #[serde(default)]
    pub portfolio_images: Vec<String>,
    pub expertise: ExpertiseLevel,
    /// Free-text professional field; vetted through the taxonomy workflow.
    pub main_field: String,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub joined_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_update: Option<ProfilePatch>,
}

impl UserProfile {
    /// Returns a copy with the patch merged into canonical fields and the
    /// staging area cleared.
    pub fn with_patch_applied(&self, patch: &ProfilePatch) -> UserProfile {
        let mut merged = self.clone();
        if let Some(name) = &patch.name {
            merged.name = name.clone();
        }
        if let Some(email) = &patch.email {
            merged.email = Some(email.clone());
        }
        if let Some(avatar_url) = &patch.avatar_url {
            merged.avatar_url = avatar_url.clone();
        }
        if let Some(portfolio_url) = &patch.portfolio_url {
            merged.portfolio_url = portfolio_url.clone();
        }
        if let Some(portfolio_images) = &patch.portfolio_images {
            merged.portfolio_images = portfolio_images.clone();
        }
        if let Some(expertise) = patch.expertise {
            merged.expertise = expertise;
        }
        if let Some(main_field) = &patch.main_field {
            merged.main_field = main_field.clone();
        }
        if let Some(interests) = &patch.interests {
            merged.interests = interests.clone();
        }
        if let Some(bio) = &patch.bio {
            merged.bio = Some(bio.clone());
        }
        merged.pending_update = None;
        merged
    }

    /// The profile as embedded into offers: the canonical public view,
    /// without the staging area.
    pub fn snapshot(&self) -> UserProfile {
        let mut snapshot = self.clone();
        snapshot.pending_update = None;
        snapshot
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A partial profile update.
///
/// Deliberately excludes `id`, `role`, `joined_at` and the staging field
/// itself, so a staged patch can never reassign identity, escalate the
/// role, or nest another patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise: Option<ExpertiseLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.avatar_url.is_none()
            && self.portfolio_url.is_none()
            && self.portfolio_images.is_none()
            && self.expertise.is_none()
            && self.main_field.is_none()
            && self.interests.is_none()
            && self.bio.is_none()
    }
}
