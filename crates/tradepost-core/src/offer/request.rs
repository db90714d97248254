//! Offer creation and edit request models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::model::{BarterOffer, DurationType, OfferStatus};
use crate::user::UserProfile;

/// Request to publish a new offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferDraft {
    /// Short headline (required)
    pub title: String,

    /// What the owner provides (required)
    pub offered_service: String,

    /// What the owner wants in return (required)
    pub requested_service: String,

    pub location: String,

    pub description: String,

    #[serde(default)]
    pub tags: BTreeSet<String>,

    pub duration_type: DurationType,

    /// Meaningful only for one-time offers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
}

impl OfferDraft {
    /// Validate the request and return errors if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required and cannot be empty".to_string());
        }

        if self.offered_service.trim().is_empty() {
            return Err("An offered service is required".to_string());
        }

        if self.requested_service.trim().is_empty() {
            return Err("A requested service is required".to_string());
        }

        Ok(())
    }

    /// Convert this draft into an offer document.
    ///
    /// The review workflow chooses `status`; the owner's profile is
    /// embedded as a snapshot with its staging area stripped.
    pub fn into_offer(
        self,
        id: impl Into<String>,
        owner: &UserProfile,
        status: OfferStatus,
        created_at: DateTime<Utc>,
    ) -> BarterOffer {
        BarterOffer {
            id: id.into(),
            profile_id: owner.id.clone(),
            profile: owner.snapshot(),
            title: self.title,
            offered_service: self.offered_service,
            requested_service: self.requested_service,
            location: self.location,
            description: self.description,
            tags: self.tags,
            duration_type: self.duration_type,
            expiration_date: self.expiration_date,
            status,
            created_at,
            ratings: Vec::new(),
            average_rating: 0.0,
        }
    }
}

/// A partial edit to an existing offer.
///
/// Carries content fields only, plus an optional status that the workflow
/// honors for admins and overrides for everyone else. Ratings and the
/// embedded profile snapshot are never supplied by callers; the workflow
/// rewrites both on every edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offered_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_type: Option<DurationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Option<DateTime<Utc>>>,
    /// Requested status. Honored as-is for admin actors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OfferStatus>,
}

impl OfferChanges {
    /// Returns a copy of `offer` with the present content fields replaced.
    ///
    /// Status, ratings, and the profile snapshot are left as-is here; the
    /// review workflow owns those.
    pub fn merged_into(&self, offer: &BarterOffer) -> BarterOffer {
        let mut merged = offer.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(offered_service) = &self.offered_service {
            merged.offered_service = offered_service.clone();
        }
        if let Some(requested_service) = &self.requested_service {
            merged.requested_service = requested_service.clone();
        }
        if let Some(location) = &self.location {
            merged.location = location.clone();
        }
        if let Some(description) = &self.description {
            merged.description = description.clone();
        }
        if let Some(tags) = &self.tags {
            merged.tags = tags.clone();
        }
        if let Some(duration_type) = self.duration_type {
            merged.duration_type = duration_type;
        }
        if let Some(expiration_date) = self.expiration_date {
            merged.expiration_date = expiration_date;
        }
        merged
    }
}
