//! # Fabrik
//!
//! Blueprint-driven construction of test objects for Rust object models.
//!
//! Fabrik builds fully-populated records from declarative blueprints so tests
//! only state the attributes they care about. It works on top of any
//! object-model technology that implements [`ObjectModel`].
//!
//! ## Core Principles
//!
//! - **Blueprints, not fixtures**: per-model attribute generators evaluated at
//!   construction time, with named variants layered over the master blueprint
//! - **Three construction modes**: `make` saves the whole object graph,
//!   `make_unsaved` saves none of it, `plan` returns flat attributes with
//!   associations reduced to foreign keys
//! - **Host agnostic**: records, storage and relationship metadata stay with
//!   the host; fabrik only talks to it through [`ObjectModel`]
//!
//! ## Feature Flags
//!
//! - `memory` (default) - In-memory reference object model ([`memory`])
//!
//! ## Quick Example
//!
//! ```rust
//! # #[cfg(feature = "memory")]
//! # fn main() -> fabrik::BuildResult<()> {
//! use fabrik::memory::{MemoryStore, ModelSchema};
//! use fabrik::prelude::*;
//!
//! let store = MemoryStore::new();
//! store
//!     .register(
//!         ModelSchema::new("Post")
//!             .column("title")
//!             .has_many("comments", "Comment", "post_id"),
//!     )
//!     .register(
//!         ModelSchema::new("Comment")
//!             .column("body")
//!             .belongs_to("post", "Post", "post_id"),
//!     );
//!
//! let factory = Factory::new(store.clone());
//! factory
//!     .blueprint("Post", Blueprint::new().sequence("title", |n| format!("Post {n}")))
//!     .blueprint("Comment", Blueprint::new().association("post").set("body", "Nice"));
//!
//! let comment = factory.make("Comment")?;
//! assert!(comment.is_persisted());
//!
//! let params = factory.plan("Comment")?.into_json()?;
//! assert_eq!(params["post_id"], serde_json::json!(2));
//!
//! let draft = factory.make_unsaved("Comment")?;
//! assert!(!draft.is_persisted());
//! assert_eq!(store.count("Post"), 2);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "memory"))]
//! # fn main() {}
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod core;
pub mod memory;

// Re-export construction entry points
pub use fabrik_core::{
	Construction, Factory, FactorySettings, is_persistence_suppressed, with_persistence_suppressed,
};

// Re-export blueprint declarations
pub use fabrik_core::{Association, Blueprint, BlueprintRegistry, FakerType, Generator, sequence};

// Re-export the object model capability
pub use fabrik_core::{AttributeMap, AttributeValue, ObjectModel, Plan, Relationship, RelationshipKind};

// Re-export error types
pub use fabrik_core::{BuildError, BuildResult};

/// Convenience re-exports for common usage.
pub mod prelude {
	pub use fabrik_core::prelude::*;

	#[cfg(feature = "memory")]
	pub use fabrik_memory::{MemoryRecord, MemoryStore, ModelSchema};
}
