//! Blueprint-driven test object construction.
//!
//! This crate builds fully-populated records for tests from declarative
//! blueprints, on top of any object-model technology:
//!
//! - **Blueprints**: ordered attribute generators per model, with named variants
//! - **Construction**: `make` (saved), `make_unsaved` (nothing saved) and `plan`
//!   (attributes only, associations flattened to foreign keys)
//! - **Collections**: build members through a parent's has-many or many-to-many
//!   relationship
//!
//! # Quick Start
//!
//! ```ignore
//! use fabrik_core::prelude::*;
//!
//! let factory = Factory::new(store);
//!
//! factory.blueprint("Person", Blueprint::new().fake("name", FakerType::Name));
//! factory.blueprint("Post", Blueprint::new().set("title", "Hello"));
//! factory.blueprint(
//!     "Comment",
//!     Blueprint::new()
//!         .association("post")
//!         .association_with("author", Association::new().model("Person"))
//!         .sequence("body", |n| format!("Comment {n}")),
//! );
//!
//! let comment = factory.make("Comment")?;
//! let draft = factory.construct("Comment").with("body", "Draft").make_unsaved()?;
//! let params = factory.plan("Comment")?.into_json()?;
//!
//! let post = factory.make("Post")?;
//! let reply = factory.collection(&post, "comments").make()?;
//! ```
//!
//! # Architecture
//!
//! - [`ObjectModel`](model::ObjectModel) - Host capability: instantiate, assign,
//!   save, relationship metadata
//! - [`Blueprint`](blueprint::Blueprint) and [`BlueprintRegistry`](blueprint::BlueprintRegistry) -
//!   Declarations and their per-model storage
//! - [`Assembly`](assembly::Assembly) - Resolves one blueprint onto one record
//! - [`PersistenceAdapter`](adapter::PersistenceAdapter) - Maps associations to
//!   foreign keys
//! - [`Factory`](factory::Factory) - Entry points and persistence policy
//! - [`scope`] - Thread-local suppressed-persistence scope

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod adapter;
pub mod assembly;
pub mod blueprint;
pub mod collection;
pub mod error;
pub mod factory;
pub mod model;
pub mod prelude;
pub mod scope;
pub mod settings;
pub mod value;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at crate root
pub use blueprint::{Association, Blueprint, BlueprintRegistry, FakerType, Generator, sequence};
pub use error::{BuildError, BuildResult};
pub use factory::{Construction, Factory};
pub use model::{ObjectModel, Relationship, RelationshipKind};
pub use scope::{is_persistence_suppressed, with_persistence_suppressed};
pub use settings::FactorySettings;
pub use value::{AttributeMap, AttributeValue, Plan};
