//! Messaging domain module.

mod model;
mod repository;

pub use model::Message;
pub use repository::MessageRepository;
