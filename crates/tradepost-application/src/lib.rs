//! Application layer for Tradepost.
//!
//! This crate provides the workflow services that coordinate between the
//! domain layer and a document-store backend: taxonomy gatekeeping and
//! resolution, the profile update gate, the offer review lifecycle,
//! messaging, ads, and the change-feed projection that keeps an in-memory
//! market state current.

pub mod account_service;
pub mod ad_service;
pub mod debounce;
pub mod message_service;
pub mod offer_service;
pub mod profile_service;
pub mod projector;
pub mod taxonomy_service;

pub use account_service::AccountService;
pub use ad_service::AdService;
pub use debounce::Debouncer;
pub use message_service::MessageService;
pub use offer_service::OfferService;
pub use profile_service::ProfileService;
pub use projector::{load_market_state, StateProjector};
pub use taxonomy_service::TaxonomyService;
