//! Offer repository trait.

use chrono::{DateTime, Utc};

use super::model::{BarterOffer, OfferStatus, Rating};
use crate::error::Result;

/// An abstract repository for offer documents.
///
/// Implementations must apply each mutation as a single atomic document
/// update and publish a change event after the write is durable.
#[async_trait::async_trait]
pub trait OfferRepository: Send + Sync {
    /// Retrieves a single offer by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<BarterOffer>>;

    /// Retrieves all offers from storage, every status included.
    async fn list_all(&self) -> Result<Vec<BarterOffer>>;

    /// Creates or fully replaces an offer document.
    async fn save(&self, offer: &BarterOffer) -> Result<()>;

    /// Deletes the offer document. Deleting a missing document is a no-op.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Rewrites just the status field.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Status written
    /// - `Err(MarketError::NotFound)`: No document under that id
    async fn set_status(&self, id: &str, status: OfferStatus) -> Result<()>;

    /// Rewrites the ratings list and cached average together.
    async fn set_ratings(&self, id: &str, ratings: &[Rating], average: f64) -> Result<()>;

    /// Retrieves offers created strictly before `threshold`, oldest first.
    async fn find_created_before(&self, threshold: DateTime<Utc>) -> Result<Vec<BarterOffer>>;
}
