//! Profile update workflow service.
//!
//! Implements the update gate: admins edit canonical fields directly,
//! everyone else stages a patch that waits for admin resolution.

use std::sync::Arc;

use tradepost_core::access::{authorize, Action, Principal};
use tradepost_core::error::{MarketError, Result};
use tradepost_core::user::{ProfilePatch, UserProfile, UserRepository};

use crate::taxonomy_service::TaxonomyService;

/// Orchestrates profile edits and their admin resolution.
pub struct ProfileService {
    /// Repository for profile documents
    user_repository: Arc<dyn UserRepository>,
    /// Gatekeeper for novel categories and interests
    taxonomy_service: Arc<TaxonomyService>,
}

impl ProfileService {
    /// Creates a new `ProfileService`.
    ///
    /// # Arguments
    ///
    /// * `user_repository` - Repository for profile documents
    /// * `taxonomy_service` - Gatekeeper invoked before every write
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        taxonomy_service: Arc<TaxonomyService>,
    ) -> Self {
        Self {
            user_repository,
            taxonomy_service,
        }
    }

    /// Submits a profile edit for `user_id`.
    ///
    /// Admin actors hit the canonical record directly, clearing any staged
    /// patch in the same write. Everyone else has the patch stored in the
    /// staging area, replacing whatever was staged before; canonical fields
    /// stay untouched until an admin resolves it.
    ///
    /// The taxonomy gatekeeper runs on both branches, so a category inside
    /// a still-pending edit is already under review.
    pub async fn submit_update(
        &self,
        actor: &Principal,
        user_id: &str,
        patch: &ProfilePatch,
    ) -> Result<()> {
        authorize(actor, &Action::UpdateProfile { target_id: user_id })?;

        if patch.is_empty() {
            return Err(MarketError::validation("profile update carries no fields"));
        }

        self.propose_from_patch(patch).await;

        if actor.is_admin() {
            self.user_repository.apply_patch(user_id, patch).await?;
            tracing::info!("[ProfileService] admin edit applied to {}", user_id);
        } else {
            self.user_repository
                .stage_pending_update(user_id, patch)
                .await?;
            tracing::info!("[ProfileService] edit staged for review on {}", user_id);
        }
        Ok(())
    }

    /// Merges the staged patch into canonical fields. Admin only.
    ///
    /// A profile without a staged patch is left untouched and the call
    /// succeeds, so resolving twice is harmless.
    pub async fn approve_update(&self, actor: &Principal, user_id: &str) -> Result<UserProfile> {
        authorize(actor, &Action::ResolveProfileUpdate)?;

        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| MarketError::not_found("User", user_id))?;

        let Some(patch) = user.pending_update else {
            return Ok(user);
        };

        self.propose_from_patch(&patch).await;

        let merged = self.user_repository.apply_patch(user_id, &patch).await?;
        tracing::info!("[ProfileService] staged edit approved for {}", user_id);
        Ok(merged)
    }

    /// Discards the staged patch without merging. Admin only.
    pub async fn reject_update(&self, actor: &Principal, user_id: &str) -> Result<()> {
        authorize(actor, &Action::ResolveProfileUpdate)?;
        self.user_repository.clear_pending_update(user_id).await?;
        tracing::info!("[ProfileService] staged edit rejected for {}", user_id);
        Ok(())
    }

    /// Removes a member's profile document. Admin only.
    ///
    /// Offers keep their embedded snapshot, so existing listings stay
    /// renderable after the owner is gone.
    pub async fn delete_user(&self, actor: &Principal, user_id: &str) -> Result<()> {
        authorize(actor, &Action::DeleteUser)?;
        self.user_repository.delete(user_id).await?;
        tracing::info!("[ProfileService] profile {} deleted", user_id);
        Ok(())
    }

    async fn propose_from_patch(&self, patch: &ProfilePatch) {
        let categories: Vec<String> = patch.main_field.iter().cloned().collect();
        let interests: Vec<String> = patch
            .interests
            .iter()
            .flat_map(|set| set.iter().cloned())
            .collect();
        if categories.is_empty() && interests.is_empty() {
            return;
        }
        self.taxonomy_service.propose(&categories, &interests).await;
    }
}
