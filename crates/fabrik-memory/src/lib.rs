//! In-memory object model for fabrik.
//!
//! [`MemoryStore`] implements [`ObjectModel`](fabrik_core::ObjectModel) over
//! schema-described tables held in memory:
//!
//! - **Schemas**: columns with constructor defaults, bulk-assignment
//!   protected columns and required columns
//! - **Relationships**: belongs-to, has-many, many-to-many through a join
//!   table, and has-many through a join model
//! - **Records**: auto-incremented ids per model, dirty tracking, reload
//!
//! # Quick Start
//!
//! ```
//! use fabrik_core::prelude::*;
//! use fabrik_memory::{MemoryStore, ModelSchema};
//!
//! let store = MemoryStore::new();
//! store
//!     .register(ModelSchema::new("Post").column("title").has_many("comments", "Comment", "post_id"))
//!     .register(ModelSchema::new("Comment").column("body").belongs_to("post", "Post", "post_id"));
//!
//! let factory = Factory::new(store.clone());
//! factory
//!     .blueprint("Post", Blueprint::new().set("title", "Hello"))
//!     .blueprint("Comment", Blueprint::new().association("post").set("body", "Hi"));
//!
//! let comment = factory.make("Comment").unwrap();
//! assert_eq!(comment.get("post_id"), Some(&serde_json::json!(1)));
//! assert_eq!(store.count("Post"), 1);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod record;
pub mod schema;
pub mod store;

pub use record::MemoryRecord;
pub use schema::{Link, ModelSchema};
pub use store::MemoryStore;
