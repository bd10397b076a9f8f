//! Persistence adapter: the one place that knows how associated records
//! map to their foreign-key identifiers.
//!
//! For example, with blueprints
//!
//! ```text
//! Post:    { }
//! Comment: { post }
//! ```
//!
//! the assembly for a comment records `{ post: <Post record> }`, but a
//! controller or API endpoint expects `{ post_id: 1 }`.
//! [`PersistenceAdapter::attributes_without_associations`] performs that
//! translation.

use serde_json::Value;

use crate::assembly::Assembly;
use crate::model::{ObjectModel, Relationship};
use crate::value::{AttributeMap, AttributeValue};

/// Relationship-aware strategy bound to one object-model technology.
#[derive(Debug)]
pub struct PersistenceAdapter<'m, M> {
	model: &'m M,
}

impl<M> Clone for PersistenceAdapter<'_, M> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<M> Copy for PersistenceAdapter<'_, M> {}

impl<'m, M: ObjectModel> PersistenceAdapter<'m, M> {
	/// Creates an adapter over `model`.
	pub fn new(model: &'m M) -> Self {
		Self { model }
	}

	/// The underlying object model.
	pub fn model(&self) -> &'m M {
		self.model
	}

	/// Relationship metadata for `attribute` of the record's model.
	///
	/// Missing metadata is not an error: the attribute is simply plain data.
	pub fn relationship(&self, record: &M::Record, attribute: &str) -> Option<Relationship> {
		self.model
			.relationship(self.model.model_of(record), attribute)
	}

	/// Returns true if `attribute` names a declared relationship.
	pub fn is_relationship(&self, record: &M::Record, attribute: &str) -> bool {
		self.relationship(record, attribute).is_some()
	}

	/// Target model of a relationship attribute.
	pub fn target_type_of(&self, record: &M::Record, attribute: &str) -> Option<String> {
		self.relationship(record, attribute)
			.map(|relationship| relationship.target)
	}

	/// Replaces single-owner associations with their foreign keys.
	///
	/// Each assigned `BelongsTo` attribute becomes an entry named after the
	/// relationship's foreign key, holding the related record's primary key
	/// (`null` while the related record is unsaved). A plain value assigned
	/// to such an attribute is carried over as the key itself. Everything
	/// else, collections included, passes through unchanged.
	pub fn attributes_without_associations(
		&self,
		assembly: &Assembly<M::Record>,
	) -> AttributeMap<M::Record> {
		let mut attributes = AttributeMap::with_capacity(assembly.assigned_attributes().len());

		for (attribute, value) in assembly.assigned_attributes() {
			match self.relationship(assembly.record(), attribute) {
				Some(relationship) if relationship.is_single_owner() => {
					let key = relationship
						.foreign_key
						.unwrap_or_else(|| format!("{attribute}_id"));
					let id = match value {
						AttributeValue::Record(related) => {
							self.model.primary_key(related).unwrap_or(Value::Null)
						}
						AttributeValue::Value(id) => id.clone(),
					};
					attributes.insert(key, AttributeValue::Value(id));
				}
				_ => {
					attributes.insert(attribute.clone(), value.clone());
				}
			}
		}

		attributes
	}
}
