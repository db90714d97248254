//! In-process authentication backend.
//!
//! Holds credentials in memory and tracks a single current session, the
//! way the hosted auth collaborator does for one browser tab. Suitable for
//! tests and local development only; nothing here hashes passwords.

use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use tradepost_core::auth::AuthProvider;

struct Account {
    principal_id: String,
    password: String,
}

/// An in-memory credential store with a session watch channel.
pub struct MemoryAuthProvider {
    /// Accounts keyed by login email.
    accounts: Mutex<HashMap<String, Account>>,
    session: watch::Sender<Option<String>>,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session,
        }
    }
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn register(&self, email: &str, password: &str) -> Result<String> {
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            bail!("an account already exists for {email}");
        }

        let principal_id = Uuid::new_v4().to_string();
        accounts.insert(
            email.to_string(),
            Account {
                principal_id: principal_id.clone(),
                password: password.to_string(),
            },
        );
        drop(accounts);

        // registering signs the new account in, like the hosted backend
        let _ = self.session.send(Some(principal_id.clone()));
        tracing::debug!("[MemoryAuthProvider] registered principal {}", principal_id);
        Ok(principal_id)
    }

    async fn login(&self, email: &str, password: &str) -> Result<String> {
        let accounts = self.accounts.lock().await;
        let Some(account) = accounts.get(email) else {
            bail!("unknown email or wrong password");
        };
        if account.password != password {
            bail!("unknown email or wrong password");
        }

        let principal_id = account.principal_id.clone();
        drop(accounts);

        let _ = self.session.send(Some(principal_id.clone()));
        Ok(principal_id)
    }

    async fn logout(&self) -> Result<()> {
        let _ = self.session.send(None);
        Ok(())
    }

    fn watch_session(&self) -> watch::Receiver<Option<String>> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_opens_a_session() {
        let auth = MemoryAuthProvider::new();
        let mut session = auth.watch_session();
        assert!(session.borrow_and_update().is_none());

        let id = auth.register("dana@example.com", "hunter22").await.unwrap();

        assert_eq!(session.borrow_and_update().as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_duplicate_registration_fails() {
        let auth = MemoryAuthProvider::new();
        auth.register("dana@example.com", "hunter22").await.unwrap();

        assert!(auth.register("dana@example.com", "other").await.is_err());
    }

    #[tokio::test]
    async fn test_login_checks_credentials() {
        let auth = MemoryAuthProvider::new();
        let id = auth.register("dana@example.com", "hunter22").await.unwrap();
        auth.logout().await.unwrap();

        assert!(auth.login("dana@example.com", "wrong").await.is_err());
        assert!(auth.login("ghost@example.com", "hunter22").await.is_err());

        let logged_in = auth.login("dana@example.com", "hunter22").await.unwrap();
        assert_eq!(logged_in, id);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let auth = MemoryAuthProvider::new();
        auth.register("dana@example.com", "hunter22").await.unwrap();
        let mut session = auth.watch_session();

        auth.logout().await.unwrap();

        assert!(session.borrow_and_update().is_none());
    }
}
