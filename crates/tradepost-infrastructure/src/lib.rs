//! Infrastructure layer for Tradepost.
//!
//! Concrete implementations of the document-store and authentication
//! collaborator traits from `tradepost-core`:
//!
//! - [`MemoryStore`]: an in-process store with a broadcast change feed,
//!   used in tests and as the development backend.
//! - [`DirStore`]: a directory of JSON documents with atomic file writes
//!   and a cross-process lock, for local single-node persistence.
//! - [`MemoryAuthProvider`]: an in-process credential backend with a
//!   session watch channel.

pub mod dir_store;
pub mod memory_auth;
pub mod memory_store;
pub mod paths;
pub mod storage;

pub use crate::dir_store::DirStore;
pub use crate::memory_auth::MemoryAuthProvider;
pub use crate::memory_store::MemoryStore;
pub use crate::paths::TradepostPaths;
