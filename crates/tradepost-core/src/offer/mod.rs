//! Offer domain module.
//!
//! # Module Structure
//!
//! - `model`: `BarterOffer`, `Rating`, status and duration vocabularies
//! - `repository`: Repository trait for offer persistence
//! - `request`: Creation draft and partial-edit request types

mod model;
mod repository;
pub mod request;

// Re-export public API
pub use model::{BarterOffer, DurationType, OfferStatus, Rating};
pub use repository::OfferRepository;
pub use request::{OfferChanges, OfferDraft};
