//! Blueprints, resolution and construction entry points.
//!
//! # Examples
//!
//! ```rust
//! use fabrik::core::blueprint::{Association, Blueprint};
//! use fabrik::core::scope::is_persistence_suppressed;
//!
//! let comment = Blueprint::new().association_with("author", Association::new().model("Person"));
//! assert!(comment.declares("author"));
//! assert!(!is_persistence_suppressed());
//! ```

pub use fabrik_core::*;
