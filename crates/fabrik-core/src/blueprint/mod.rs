//! Blueprints: ordered attribute generators registered per model.
//!
//! ```
//! use fabrik_core::blueprint::{Association, Blueprint, FakerType};
//!
//! let comment = Blueprint::new()
//!     .association("post")
//!     .association_with("author", Association::new().with("name", "Fred"))
//!     .fake("body", FakerType::Sentence)
//!     .sequence("position", |n| n);
//!
//! let names: Vec<&str> = comment.attribute_names().collect();
//! assert_eq!(names, ["post", "author", "body", "position"]);
//! ```

mod faker;
mod generator;
mod registry;

pub use faker::{FakerType, generate_fake};
pub use generator::{Association, Generator, Sequence, sequence};
pub use registry::BlueprintRegistry;

use serde_json::Value;

use crate::error::BuildResult;

/// Ordered `(attribute, generator)` pairs for one model.
#[derive(Debug, Clone, Default)]
pub struct Blueprint {
	entries: Vec<(String, Generator)>,
}

impl Blueprint {
	/// Creates an empty blueprint.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an attribute with any generator.
	pub fn attribute(mut self, attribute: impl Into<String>, generator: impl Into<Generator>) -> Self {
		self.entries.push((attribute.into(), generator.into()));
		self
	}

	/// Appends an attribute with a fixed value.
	pub fn set(self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attribute(attribute, Generator::constant(value))
	}

	/// Appends an attribute produced lazily.
	pub fn lazy<V, F>(self, attribute: impl Into<String>, f: F) -> Self
	where
		V: Into<Value>,
		F: Fn() -> V + Send + Sync + 'static,
	{
		self.attribute(attribute, Generator::lazy(f))
	}

	/// Appends an attribute produced by a fallible producer.
	pub fn try_lazy<F>(self, attribute: impl Into<String>, f: F) -> Self
	where
		F: Fn() -> BuildResult<Value> + Send + Sync + 'static,
	{
		self.attribute(attribute, Generator::try_lazy(f))
	}

	/// Appends an association built with the target model's master blueprint.
	pub fn association(self, attribute: impl Into<String>) -> Self {
		self.attribute(attribute, Generator::association())
	}

	/// Appends an association with an explicit model, blueprint or overrides.
	pub fn association_with(self, attribute: impl Into<String>, association: Association) -> Self {
		self.attribute(attribute, association)
	}

	/// Appends a numbered attribute.
	pub fn sequence<V, F>(self, attribute: impl Into<String>, f: F) -> Self
	where
		V: Into<Value>,
		F: Fn(u64) -> V + Send + Sync + 'static,
	{
		self.attribute(attribute, Generator::sequence(f))
	}

	/// Appends a fake-data attribute.
	pub fn fake(self, attribute: impl Into<String>, faker: FakerType) -> Self {
		self.attribute(attribute, Generator::fake(faker))
	}

	/// Entries in declaration order.
	pub fn entries(&self) -> &[(String, Generator)] {
		&self.entries
	}

	/// Attribute names in declaration order.
	pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(name, _)| name.as_str())
	}

	/// Returns true if the blueprint declares `attribute`.
	pub fn declares(&self, attribute: &str) -> bool {
		self.entries.iter().any(|(name, _)| name == attribute)
	}

	/// Number of declared attributes.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if nothing is declared.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
