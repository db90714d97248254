//! Path resolution for local tradepost data.
//!
//! All local persistence lives under one data directory:
//!
//! ```text
//! ~/.local/share/tradepost/        # data directory (platform equivalent)
//! ├── users/                       # one JSON document per profile
//! ├── offers/
//! ├── messages/
//! ├── system_ads/
//! ├── taxonomy.json                # the shared singleton document
//! └── .store.lock                  # advisory lock for batch writes
//!
//! ~/.config/tradepost/config.toml  # deployment configuration
//! ```

use std::path::PathBuf;

use tradepost_core::error::{MarketError, Result};

/// Resolves the platform directories used by the file-backed store.
pub struct TradepostPaths;

impl TradepostPaths {
    const APP_DIR: &'static str = "tradepost";

    /// The data directory holding the document collections.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: e.g. `~/.local/share/tradepost/`
    /// - `Err(MarketError::Config)`: No home directory on this system
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or_else(|| MarketError::config("cannot resolve a data directory"))
    }

    /// The configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: e.g. `~/.config/tradepost/`
    /// - `Err(MarketError::Config)`: No home directory on this system
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or_else(|| MarketError::config("cannot resolve a config directory"))
    }

    /// The deployment configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directories_end_with_app_name() {
        // dirs may legitimately fail on a stripped-down CI user; only
        // assert the shape when resolution succeeds
        if let Ok(dir) = TradepostPaths::data_dir() {
            assert!(dir.ends_with("tradepost"));
        }
        if let Ok(file) = TradepostPaths::config_file() {
            assert!(file.ends_with("tradepost/config.toml"));
        }
    }
}
