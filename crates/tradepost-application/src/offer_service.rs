//! Offer review workflow service.
//!
//! Owns the offer lifecycle: publication, the edit trust boundary, admin
//! status decisions, ratings, and retention cleanup.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use tradepost_core::access::{authorize, Action, Principal};
use tradepost_core::error::{MarketError, Result};
use tradepost_core::offer::{
    BarterOffer, OfferChanges, OfferDraft, OfferRepository, OfferStatus, Rating,
};
use tradepost_core::user::UserRepository;

use crate::taxonomy_service::TaxonomyService;

/// Orchestrates the offer lifecycle.
pub struct OfferService {
    /// Repository for offer documents
    offer_repository: Arc<dyn OfferRepository>,
    /// Repository for profiles, read to stamp snapshots
    user_repository: Arc<dyn UserRepository>,
    /// Gatekeeper for novel tags
    taxonomy_service: Arc<TaxonomyService>,
}

impl OfferService {
    /// Creates a new `OfferService`.
    ///
    /// # Arguments
    ///
    /// * `offer_repository` - Repository for offer documents
    /// * `user_repository` - Repository for profiles
    /// * `taxonomy_service` - Gatekeeper invoked on publish and edit
    pub fn new(
        offer_repository: Arc<dyn OfferRepository>,
        user_repository: Arc<dyn UserRepository>,
        taxonomy_service: Arc<TaxonomyService>,
    ) -> Self {
        Self {
            offer_repository,
            user_repository,
            taxonomy_service,
        }
    }

    /// Publishes a new offer owned by the actor.
    ///
    /// Member offers start pending review; admin offers go straight to
    /// active. The owner's canonical profile is embedded as a snapshot, and
    /// novel tags are staged with the taxonomy gatekeeper.
    pub async fn create(&self, actor: &Principal, draft: OfferDraft) -> Result<BarterOffer> {
        draft.validate().map_err(MarketError::validation)?;

        let owner = self
            .user_repository
            .find_by_id(&actor.id)
            .await?
            .ok_or_else(|| MarketError::not_found("User", actor.id.clone()))?;

        let tags: Vec<String> = draft.tags.iter().cloned().collect();
        self.taxonomy_service.propose(&tags, &[]).await;

        let status = if actor.is_admin() {
            OfferStatus::Active
        } else {
            OfferStatus::Pending
        };

        let offer = draft.into_offer(Uuid::new_v4().to_string(), &owner, status, Utc::now());
        self.offer_repository.save(&offer).await?;

        tracing::info!("[OfferService] offer {} published as {}", offer.id, offer.status);
        Ok(offer)
    }

    /// Edits an offer's content.
    ///
    /// This is the trust boundary of the review workflow: a non-admin edit
    /// always lands back in pending, whatever status the caller asked for,
    /// while an admin edit keeps the status it supplies (or the stored one
    /// if it supplies none). Every edit clears ratings, and the embedded
    /// profile snapshot is refreshed from the owner's canonical record.
    pub async fn update(
        &self,
        actor: &Principal,
        offer_id: &str,
        changes: &OfferChanges,
    ) -> Result<BarterOffer> {
        let offer = self
            .offer_repository
            .find_by_id(offer_id)
            .await?
            .ok_or_else(|| MarketError::not_found("Offer", offer_id))?;

        authorize(
            actor,
            &Action::EditOffer {
                owner_id: &offer.profile_id,
            },
        )?;

        let mut updated = changes.merged_into(&offer);

        updated.status = if actor.is_admin() {
            changes.status.unwrap_or(offer.status)
        } else {
            OfferStatus::Pending
        };
        // an edited offer is a new claim: prior endorsements no longer apply
        updated.clear_ratings();

        if let Some(owner) = self.user_repository.find_by_id(&offer.profile_id).await? {
            updated.profile = owner.snapshot();
        }

        let tags: Vec<String> = updated.tags.iter().cloned().collect();
        self.taxonomy_service.propose(&tags, &[]).await;

        self.offer_repository.save(&updated).await?;

        tracing::info!(
            "[OfferService] offer {} edited, status now {}",
            updated.id,
            updated.status
        );
        Ok(updated)
    }

    /// Marks a pending offer as reviewed and publicly visible. Admin only.
    pub async fn approve(&self, actor: &Principal, offer_id: &str) -> Result<()> {
        self.set_status(actor, offer_id, OfferStatus::Active).await
    }

    /// Declines an offer, hiding it from everyone but owner and admins.
    /// Admin only.
    pub async fn reject(&self, actor: &Principal, offer_id: &str) -> Result<()> {
        self.set_status(actor, offer_id, OfferStatus::Rejected).await
    }

    /// Writes an offer's stored status directly. Admin only.
    ///
    /// Expiry is derived from the expiration date at display time and is
    /// never stored, so `Expired` is rejected here.
    pub async fn set_status(
        &self,
        actor: &Principal,
        offer_id: &str,
        status: OfferStatus,
    ) -> Result<()> {
        authorize(actor, &Action::SetOfferStatus)?;

        if status == OfferStatus::Expired {
            return Err(MarketError::validation(
                "expired is derived from the expiration date, not stored",
            ));
        }

        self.offer_repository.set_status(offer_id, status).await?;
        tracing::info!("[OfferService] offer {} set to {}", offer_id, status);
        Ok(())
    }

    /// Deletes an offer. Owner or admin; deleting an already-deleted offer
    /// succeeds quietly.
    pub async fn delete(&self, actor: &Principal, offer_id: &str) -> Result<()> {
        let Some(offer) = self.offer_repository.find_by_id(offer_id).await? else {
            return Ok(());
        };

        authorize(
            actor,
            &Action::DeleteOffer {
                owner_id: &offer.profile_id,
            },
        )?;

        self.offer_repository.delete(offer_id).await?;
        tracing::info!("[OfferService] offer {} deleted", offer_id);
        Ok(())
    }

    /// Records the actor's score for an offer, replacing their previous
    /// one. Owners cannot score their own offers.
    pub async fn rate(&self, actor: &Principal, offer_id: &str, score: u8) -> Result<BarterOffer> {
        if !(1..=5).contains(&score) {
            return Err(MarketError::validation("score must be between 1 and 5"));
        }

        let mut offer = self
            .offer_repository
            .find_by_id(offer_id)
            .await?
            .ok_or_else(|| MarketError::not_found("Offer", offer_id))?;

        authorize(
            actor,
            &Action::RateOffer {
                owner_id: &offer.profile_id,
            },
        )?;

        offer.upsert_rating(Rating {
            user_id: actor.id.clone(),
            score,
        });
        self.offer_repository
            .set_ratings(offer_id, &offer.ratings, offer.average_rating)
            .await?;

        Ok(offer)
    }

    /// Deletes every offer created strictly before `threshold`. Admin only.
    ///
    /// Deletions run one by one and stop at the first failure; offers
    /// already deleted stay deleted. The error names how far the batch got.
    ///
    /// # Returns
    ///
    /// - `Ok(usize)`: Number of offers deleted
    pub async fn delete_older_than(
        &self,
        actor: &Principal,
        threshold: DateTime<Utc>,
    ) -> Result<usize> {
        authorize(actor, &Action::PurgeOffers)?;

        let stale = self.offer_repository.find_created_before(threshold).await?;
        let total = stale.len();

        let mut deleted = 0usize;
        for offer in &stale {
            if let Err(error) = self.offer_repository.delete(&offer.id).await {
                tracing::warn!(
                    "[OfferService] bulk delete stopped at {}/{}: {}",
                    deleted,
                    total,
                    error
                );
                return Err(MarketError::storage(
                    "bulk delete",
                    format!("stopped after {deleted} of {total} deletions: {error}"),
                ));
            }
            deleted += 1;
        }

        tracing::info!("[OfferService] bulk delete removed {} offer(s)", deleted);
        Ok(deleted)
    }
}
