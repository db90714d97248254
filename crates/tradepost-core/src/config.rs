//! Deployment configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::taxonomy::TaxonomySeed;

/// Tunables read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Accounts registering with this email get the admin role.
    #[serde(default)]
    pub admin_email: Option<String>,

    /// Quiet period for text-input driven filters, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Starter vocabulary written on first taxonomy access.
    #[serde(default)]
    pub taxonomy_seed: TaxonomySeed,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            admin_email: None,
            debounce_ms: default_debounce_ms(),
            taxonomy_seed: TaxonomySeed::default(),
        }
    }
}

impl MarketConfig {
    /// Parses a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Whether `email` designates the deployment admin.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_email.as_deref() == Some(email)
    }
}
