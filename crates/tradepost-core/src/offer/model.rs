//! Barter offer domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::Display;

use crate::user::UserProfile;

/// Moderation state of an offer.
///
/// `Expired` exists in the stored vocabulary but is normally derived at
/// display time from `expirationDate`; the review workflow never writes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OfferStatus {
    Active,
    #[default]
    Pending,
    Rejected,
    Expired,
}

/// Whether an offer is a one-shot exchange or a standing arrangement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DurationType {
    #[default]
    OneTime,
    Ongoing,
}

/// A single member's score for an offer, 1 to 5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub user_id: String,
    pub score: u8,
}

/// A service-barter offer as stored in the `offers` collection.
///
/// `profile` is a denormalized snapshot of the owner taken at create/edit
/// time; it is intentionally not live-synced to the canonical profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarterOffer {
    pub id: String,
    /// Weak reference to the owning profile by id.
    pub profile_id: String,
    pub profile: UserProfile,
    pub title: String,
    pub offered_service: String,
    pub requested_service: String,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub duration_type: DurationType,
    /// Meaningful only for one-time offers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    #[serde(default)]
    pub average_rating: f64,
}

impl BarterOffer {
    /// Records `rating`, replacing the rater's previous entry if present,
    /// and refreshes the cached average.
    pub fn upsert_rating(&mut self, rating: Rating) {
        self.ratings.retain(|r| r.user_id != rating.user_id);
        self.ratings.push(rating);
        self.recompute_average();
    }

    /// Drops all ratings and zeroes the cached average.
    pub fn clear_ratings(&mut self) {
        self.ratings.clear();
        self.average_rating = 0.0;
    }

    /// Recomputes the cached average, rounded to one decimal place.
    /// An unrated offer averages 0.
    pub fn recompute_average(&mut self) {
        if self.ratings.is_empty() {
            self.average_rating = 0.0;
            return;
        }
        let total: u32 = self.ratings.iter().map(|r| u32::from(r.score)).sum();
        let average = f64::from(total) / self.ratings.len() as f64;
        self.average_rating = (average * 10.0).round() / 10.0;
    }

    /// The status to show for this offer at `now`.
    ///
    /// A one-time offer whose expiration date has passed displays as
    /// expired whatever its stored status says; expiry is never written
    /// back to the store.
    pub fn display_status(&self, now: DateTime<Utc>) -> OfferStatus {
        if self.duration_type == DurationType::OneTime {
            if let Some(expiration) = self.expiration_date {
                if expiration < now {
                    return OfferStatus::Expired;
                }
            }
        }
        self.status
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.profile_id == user_id
    }
}
