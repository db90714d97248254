//! User domain module.
//!
//! This module contains all member-profile domain models, the repository
//! interface, and the registration request type.
//!
//! # Module Structure
//!
//! - `model`: Core profile domain models (`UserProfile`, `ProfilePatch`, `Role`)
//! - `repository`: Repository trait for profile persistence
//! - `request`: Registration request with new-member defaults

mod model;
mod repository;
pub mod request;

// Re-export public API
pub use model::{ExpertiseLevel, ProfilePatch, Role, UserProfile};
pub use repository::UserRepository;
pub use request::Registration;
