//! Sponsored ad workflow service.
//!
//! Ad placement is revenue plumbing, not a member-facing action, so write
//! failures here are logged and swallowed; only the admin check itself can
//! fail the call.

use std::sync::Arc;

use tradepost_core::access::{authorize, Action, Principal};
use tradepost_core::ad::{AdRepository, SystemAd};
use tradepost_core::error::Result;

/// Orchestrates sponsored ad management.
pub struct AdService {
    /// Repository for ad documents
    ad_repository: Arc<dyn AdRepository>,
}

impl AdService {
    /// Creates a new `AdService`.
    ///
    /// # Arguments
    ///
    /// * `ad_repository` - Repository for ad documents
    pub fn new(ad_repository: Arc<dyn AdRepository>) -> Self {
        Self { ad_repository }
    }

    /// Creates or replaces an ad. Admin only; best-effort write.
    pub async fn save(&self, actor: &Principal, ad: &SystemAd) -> Result<()> {
        authorize(actor, &Action::ManageAds)?;

        if let Err(error) = self.ad_repository.save(ad).await {
            tracing::warn!("[AdService] ad {} save failed: {}", ad.id, error);
        }
        Ok(())
    }

    /// Deletes an ad. Admin only; best-effort write.
    pub async fn delete(&self, actor: &Principal, ad_id: &str) -> Result<()> {
        authorize(actor, &Action::ManageAds)?;

        if let Err(error) = self.ad_repository.delete(ad_id).await {
            tracing::warn!("[AdService] ad {} delete failed: {}", ad_id, error);
        }
        Ok(())
    }
}
