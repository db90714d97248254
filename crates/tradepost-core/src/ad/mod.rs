//! Sponsored ad domain module.

mod model;
mod repository;

pub use model::SystemAd;
pub use repository::AdRepository;
