//! In-memory object model.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(feature = "memory")]
//! # {
//! use fabrik::memory::{MemoryStore, ModelSchema};
//!
//! let store = MemoryStore::new();
//! store.register(ModelSchema::new("Person").column("name").protected("password"));
//! assert!(store.schema("Person").is_some());
//! # }
//! ```

#[cfg(feature = "memory")]
pub use fabrik_memory::*;
