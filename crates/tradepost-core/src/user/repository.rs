//! User repository trait.
//!
//! Defines the interface for profile persistence against the document
//! store's `users` collection.

use super::model::{ProfilePatch, UserProfile};
use crate::error::Result;

/// An abstract repository for managing member profiles.
///
/// This trait defines the contract for persisting and retrieving profiles,
/// decoupling the workflow layer from the specific storage mechanism
/// (in-memory store, JSON directory, remote document database).
///
/// # Implementation Notes
///
/// Implementations must apply each mutation as a single atomic document
/// update and publish a change event after the write is durable.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Retrieves a single profile by account id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(UserProfile))`: The stored profile
    /// - `Ok(None)`: No document under that id
    /// - `Err(MarketError)`: Error if retrieval fails
    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>>;

    /// Retrieves all profiles from storage.
    async fn list_all(&self) -> Result<Vec<UserProfile>>;

    /// Creates or fully replaces a profile document.
    ///
    /// # Arguments
    ///
    /// * `user` - The profile to write, keyed by `user.id`
    async fn save(&self, user: &UserProfile) -> Result<()>;

    /// Merges a staged patch into canonical fields and clears the staging
    /// area, as one atomic update.
    ///
    /// # Returns
    ///
    /// - `Ok(UserProfile)`: The merged profile as now stored
    /// - `Err(MarketError::NotFound)`: No document under that id
    async fn apply_patch(&self, user_id: &str, patch: &ProfilePatch) -> Result<UserProfile>;

    /// Stages a patch in the profile's `pendingUpdate` field, replacing any
    /// previously staged patch. Canonical fields are untouched.
    ///
    /// # Returns
    ///
    /// - `Err(MarketError::NotFound)`: No document under that id
    async fn stage_pending_update(&self, user_id: &str, patch: &ProfilePatch) -> Result<()>;

    /// Clears the staged patch. Clearing an absent patch is a no-op, but a
    /// missing profile document is an error.
    async fn clear_pending_update(&self, user_id: &str) -> Result<()>;

    /// Deletes the profile document. Deleting a missing document is a no-op.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Retrieves every profile whose `mainField` equals `main_field` exactly.
    async fn find_by_main_field(&self, main_field: &str) -> Result<Vec<UserProfile>>;

    /// Rewrites `mainField` to `new_field` on every listed profile.
    ///
    /// The whole batch commits or none of it does; a partially reassigned
    /// category must never become observable.
    ///
    /// # Arguments
    ///
    /// * `user_ids` - Account ids to rewrite
    /// * `new_field` - Replacement category for all of them
    async fn set_main_field(&self, user_ids: &[String], new_field: &str) -> Result<()>;
}
