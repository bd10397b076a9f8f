//! Convenience re-exports for common usage.
//!
//! # Example
//!
//! ```ignore
//! use fabrik_core::prelude::*;
//!
//! // Now you have access to:
//! // - Factory and its construction builders
//! // - Blueprint declarations and generators
//! // - The ObjectModel capability
//! // - Error types
//! ```

// Error types
pub use crate::error::{BuildError, BuildResult};

// Construction
pub use crate::collection::CollectionConstruction;
pub use crate::factory::{Construction, Factory};
pub use crate::settings::FactorySettings;

// Blueprint types
pub use crate::blueprint::{
	Association, Blueprint, BlueprintRegistry, FakerType, Generator, Sequence,
};

// Blueprint functions
pub use crate::blueprint::{generate_fake, sequence};

// Object model capability
pub use crate::adapter::PersistenceAdapter;
pub use crate::model::{ObjectModel, Relationship, RelationshipKind};
pub use crate::value::{AttributeMap, AttributeValue, Plan};

// Persistence scope
pub use crate::scope::{is_persistence_suppressed, with_persistence_suppressed};
