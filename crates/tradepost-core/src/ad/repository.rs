//! Ad repository trait.

use super::model::SystemAd;
use crate::error::Result;

/// An abstract repository for sponsored ad documents.
#[async_trait::async_trait]
pub trait AdRepository: Send + Sync {
    /// Retrieves a single ad by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<SystemAd>>;

    /// Retrieves all ads, active or not.
    async fn list_all(&self) -> Result<Vec<SystemAd>>;

    /// Creates or fully replaces an ad document.
    async fn save(&self, ad: &SystemAd) -> Result<()>;

    /// Deletes the ad document. Deleting a missing document is a no-op.
    async fn delete(&self, id: &str) -> Result<()>;
}
