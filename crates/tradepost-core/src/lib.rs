pub mod access;
pub mod ad;
pub mod auth;
pub mod config;
pub mod discovery;
pub mod error;
pub mod event;
pub mod message;
pub mod offer;
pub mod state;
pub mod taxonomy;
pub mod user;

// Re-export common error type
pub use error::MarketError;
