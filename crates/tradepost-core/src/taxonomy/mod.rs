//! Taxonomy domain module.
//!
//! The shared category/interest vocabulary, its gatekeeper and resolution
//! rules, the repository interface, and the first-run seed.
//!
//! # Module Structure
//!
//! - `model`: `Taxonomy` document and `TaxonomyChange` set operations
//! - `repository`: Repository trait for the single shared document
//! - `seed`: Starter vocabulary for fresh deployments

mod model;
mod repository;
mod seed;

// Re-export public API
pub use model::{Taxonomy, TaxonomyChange};
pub use repository::TaxonomyRepository;
pub use seed::TaxonomySeed;
