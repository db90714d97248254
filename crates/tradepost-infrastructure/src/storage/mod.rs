//! Storage primitives shared by the file-backed store.

pub mod atomic_json;

pub use atomic_json::{AtomicJsonFile, DirLock};
