//! Account workflow service.
//!
//! Registration, login, and session observation against the auth
//! collaborator, keeping profile documents in step with issued accounts.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;

use tradepost_core::auth::AuthProvider;
use tradepost_core::config::MarketConfig;
use tradepost_core::error::{MarketError, Result};
use tradepost_core::user::{Registration, Role, UserProfile, UserRepository};

use crate::taxonomy_service::TaxonomyService;

/// Orchestrates account lifecycle against the auth collaborator.
pub struct AccountService {
    /// Credential and session backend
    auth_provider: Arc<dyn AuthProvider>,
    /// Repository for profile documents
    user_repository: Arc<dyn UserRepository>,
    /// Gatekeeper for novel categories and interests
    taxonomy_service: Arc<TaxonomyService>,
    /// Deployment tunables, read for the admin email
    config: MarketConfig,
}

impl AccountService {
    /// Creates a new `AccountService`.
    ///
    /// # Arguments
    ///
    /// * `auth_provider` - Credential and session backend
    /// * `user_repository` - Repository for profile documents
    /// * `taxonomy_service` - Gatekeeper invoked before profile creation
    /// * `config` - Deployment tunables
    pub fn new(
        auth_provider: Arc<dyn AuthProvider>,
        user_repository: Arc<dyn UserRepository>,
        taxonomy_service: Arc<TaxonomyService>,
        config: MarketConfig,
    ) -> Self {
        Self {
            auth_provider,
            user_repository,
            taxonomy_service,
            config,
        }
    }

    /// Registers an account and writes its initial profile document.
    ///
    /// Novel free-text values in the registration go through the taxonomy
    /// gatekeeper first; that step is best-effort and never blocks the
    /// registration itself. The account registering with the configured
    /// admin email receives the admin role.
    pub async fn register(&self, registration: Registration) -> Result<UserProfile> {
        registration.validate().map_err(MarketError::validation)?;

        let categories: Vec<String> = registration.main_field.iter().cloned().collect();
        let interests: Vec<String> = registration.interests.iter().cloned().collect();
        self.taxonomy_service.propose(&categories, &interests).await;

        let principal_id = self
            .auth_provider
            .register(&registration.email, &registration.password)
            .await
            .map_err(|error| MarketError::auth(error.to_string()))?;

        let role = if self.config.is_admin_email(&registration.email) {
            Role::Admin
        } else {
            Role::User
        };

        let profile = registration.into_profile(principal_id, role, Utc::now());
        self.user_repository.save(&profile).await?;

        tracing::info!("[AccountService] registered {} ({})", profile.id, profile.role);
        Ok(profile)
    }

    /// Verifies credentials and returns the signed-in member's profile.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let principal_id = self
            .auth_provider
            .login(email, password)
            .await
            .map_err(|error| MarketError::auth(error.to_string()))?;

        let profile = self
            .user_repository
            .find_by_id(&principal_id)
            .await?
            .ok_or_else(|| MarketError::not_found("User", principal_id.clone()))?;

        tracing::debug!("[AccountService] login for {}", profile.id);
        Ok(profile)
    }

    /// Ends the current session.
    pub async fn logout(&self) -> Result<()> {
        self.auth_provider
            .logout()
            .await
            .map_err(|error| MarketError::auth(error.to_string()))
    }

    /// Subscribes to session transitions from the auth collaborator.
    pub fn watch_session(&self) -> watch::Receiver<Option<String>> {
        self.auth_provider.watch_session()
    }

    /// The profile behind the current session, if signed in.
    ///
    /// A session whose profile document has vanished counts as signed out.
    pub async fn current_profile(&self) -> Result<Option<UserProfile>> {
        let session = self.auth_provider.watch_session().borrow().clone();
        match session {
            Some(id) => self.user_repository.find_by_id(&id).await,
            None => Ok(None),
        }
    }
}
