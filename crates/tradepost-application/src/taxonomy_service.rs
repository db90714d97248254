//! Taxonomy workflow service.
//!
//! Front door for everything that touches the shared vocabulary: the
//! best-effort gatekeeper used by registration, profile, and offer paths,
//! and the admin-only resolution operations.

use std::sync::Arc;

use tradepost_core::access::{authorize, Action, Principal};
use tradepost_core::error::Result;
use tradepost_core::taxonomy::{Taxonomy, TaxonomyRepository, TaxonomySeed};
use tradepost_core::user::UserRepository;

/// Orchestrates gatekeeping and admin resolution of the shared taxonomy.
pub struct TaxonomyService {
    /// Repository for the single shared taxonomy document
    taxonomy_repository: Arc<dyn TaxonomyRepository>,
    /// Repository for profiles, needed by category reassignment
    user_repository: Arc<dyn UserRepository>,
    /// Starter vocabulary for first access
    seed: TaxonomySeed,
}

impl TaxonomyService {
    /// Creates a new `TaxonomyService`.
    ///
    /// # Arguments
    ///
    /// * `taxonomy_repository` - Repository for the shared taxonomy document
    /// * `user_repository` - Repository for profiles
    /// * `seed` - Starter vocabulary used on first access
    pub fn new(
        taxonomy_repository: Arc<dyn TaxonomyRepository>,
        user_repository: Arc<dyn UserRepository>,
        seed: TaxonomySeed,
    ) -> Self {
        Self {
            taxonomy_repository,
            user_repository,
            seed,
        }
    }

    /// The current vocabulary, seeding the document on first access.
    pub async fn current(&self) -> Result<Taxonomy> {
        self.taxonomy_repository.load_or_seed(&self.seed).await
    }

    /// Stages novel categories and interests for admin review.
    ///
    /// Best-effort by contract: values already approved or pending are
    /// skipped, and any storage failure is logged and swallowed so the
    /// primary action (registration, profile save, offer publish) never
    /// blocks on a vocabulary suggestion.
    pub async fn propose(&self, categories: &[String], interests: &[String]) {
        let taxonomy = match self.taxonomy_repository.load_or_seed(&self.seed).await {
            Ok(taxonomy) => taxonomy,
            Err(error) => {
                tracing::warn!("[TaxonomyService] proposal skipped, load failed: {}", error);
                return;
            }
        };

        let mut changes = Vec::new();
        for value in categories {
            if let Some(change) = taxonomy.category_proposal(value) {
                changes.push(change);
            }
        }
        for value in interests {
            if let Some(change) = taxonomy.interest_proposal(value) {
                changes.push(change);
            }
        }
        if changes.is_empty() {
            return;
        }

        tracing::debug!(
            "[TaxonomyService] staging {} novel value(s) for review",
            changes.len()
        );
        if let Err(error) = self.taxonomy_repository.apply(&changes).await {
            tracing::warn!("[TaxonomyService] proposal write failed: {}", error);
        }
    }

    /// Convenience wrapper for a single free-text category.
    pub async fn propose_category(&self, value: &str) {
        self.propose(std::slice::from_ref(&value.to_string()), &[])
            .await;
    }

    /// Convenience wrapper for a single free-text interest.
    pub async fn propose_interest(&self, value: &str) {
        self.propose(&[], std::slice::from_ref(&value.to_string()))
            .await;
    }

    /// Promotes a pending category to the approved set. Admin only.
    pub async fn approve_category(&self, actor: &Principal, value: &str) -> Result<Taxonomy> {
        authorize(actor, &Action::ModerateTaxonomy)?;
        self.taxonomy_repository
            .apply(&Taxonomy::approve_category(value))
            .await
    }

    /// Drops a pending category, leaving the approved set untouched.
    /// Admin only.
    pub async fn reject_category(&self, actor: &Principal, value: &str) -> Result<Taxonomy> {
        authorize(actor, &Action::ModerateTaxonomy)?;
        self.taxonomy_repository
            .apply(&Taxonomy::reject_category(value))
            .await
    }

    /// Promotes a pending interest to the approved set. Admin only.
    pub async fn approve_interest(&self, actor: &Principal, value: &str) -> Result<Taxonomy> {
        authorize(actor, &Action::ModerateTaxonomy)?;
        self.taxonomy_repository
            .apply(&Taxonomy::approve_interest(value))
            .await
    }

    /// Drops an interest from both the approved and pending sets.
    /// Admin only.
    pub async fn reject_interest(&self, actor: &Principal, value: &str) -> Result<Taxonomy> {
        authorize(actor, &Action::ModerateTaxonomy)?;
        self.taxonomy_repository
            .apply(&Taxonomy::reject_interest(value))
            .await
    }

    /// Folds a near-duplicate category into another one.
    ///
    /// Every profile whose field equals `old_value` is rewritten to
    /// `new_value` in one all-or-nothing batch, then `old_value` is dropped
    /// from the pending set. Admin only.
    ///
    /// # Returns
    ///
    /// - `Ok(usize)`: Number of profiles rewritten
    /// - `Err(MarketError)`: Authorization or write failure; the profile
    ///   batch either fully applied or not at all
    pub async fn reassign_category(
        &self,
        actor: &Principal,
        old_value: &str,
        new_value: &str,
    ) -> Result<usize> {
        authorize(actor, &Action::ModerateTaxonomy)?;

        let affected = self.user_repository.find_by_main_field(old_value).await?;
        let ids: Vec<String> = affected.iter().map(|u| u.id.clone()).collect();

        if !ids.is_empty() {
            self.user_repository.set_main_field(&ids, new_value).await?;
        }

        self.taxonomy_repository
            .apply(&Taxonomy::reject_category(old_value))
            .await?;

        tracing::info!(
            "[TaxonomyService] reassigned {} profile(s) from '{}' to '{}'",
            ids.len(),
            old_value,
            new_value
        );
        Ok(ids.len())
    }
}
