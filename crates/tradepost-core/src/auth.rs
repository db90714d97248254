//! Authentication collaborator trait.
//!
//! Credential handling lives entirely behind this boundary; the workflows
//! only ever see an opaque principal id.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;

/// An abstract authentication backend.
///
/// Implementations own credential storage and session state. Errors are
/// deliberately opaque here (`anyhow`) so backends can surface whatever
/// their transport produces; workflows translate them at the boundary.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Creates an account and returns the new principal id.
    ///
    /// # Arguments
    ///
    /// * `email` - Login email, unique per deployment
    /// * `password` - Plaintext credential, hashed or forwarded downstream
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The issued principal id
    /// - `Err(_)`: Email taken, or the backend refused the credential
    async fn register(&self, email: &str, password: &str) -> Result<String>;

    /// Verifies credentials and opens a session.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The authenticated principal id
    /// - `Err(_)`: Unknown email or wrong password
    async fn login(&self, email: &str, password: &str) -> Result<String>;

    /// Ends the current session, if any.
    async fn logout(&self) -> Result<()>;

    /// Subscribes to session changes.
    ///
    /// The channel holds the currently signed-in principal id, or `None`
    /// when signed out; subscribers observe every transition.
    fn watch_session(&self) -> watch::Receiver<Option<String>>;
}
