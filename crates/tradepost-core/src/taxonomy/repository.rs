//! Taxonomy repository trait.
//!
//! Defines the interface for the single shared taxonomy document.

use super::model::{Taxonomy, TaxonomyChange};
use super::seed::TaxonomySeed;
use crate::error::Result;

/// An abstract repository for the shared taxonomy document.
///
/// There is exactly one taxonomy document per deployment. Implementations
/// must apply change batches atomically and publish a change event carrying
/// the full post-change document.
#[async_trait::async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// Loads the taxonomy document, writing the seed first if the document
    /// does not exist yet.
    ///
    /// # Arguments
    ///
    /// * `seed` - Starter vocabulary used only on first access
    async fn load_or_seed(&self, seed: &TaxonomySeed) -> Result<Taxonomy>;

    /// Applies a batch of set operations as one atomic document update.
    ///
    /// Applying against a missing document starts from an empty taxonomy.
    ///
    /// # Returns
    ///
    /// - `Ok(Taxonomy)`: The document as stored after the batch
    /// - `Err(MarketError)`: Error if the write fails; nothing was applied
    async fn apply(&self, changes: &[TaxonomyChange]) -> Result<Taxonomy>;
}
