//! The host object model capability.
//!
//! fabrik does not own records, schemas or storage. Any object-model
//! technology becomes buildable by implementing [`ObjectModel`]; the
//! resolver and the persistence adapter never look past this trait.

use std::fmt;

use serde_json::Value;

use crate::error::BuildResult;
use crate::value::AttributeValue;

/// Kind of relationship between two models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
	/// Single owner: the record stores the related record's key (many-to-one).
	BelongsTo,
	/// The related record stores this record's key (one-to-one).
	HasOne,
	/// Collection: related records store this record's key.
	HasMany,
	/// Collection linked through a join table or join model.
	ManyToMany,
}

impl RelationshipKind {
	/// Returns true for relationships that own a collection of records.
	pub fn is_collection(self) -> bool {
		matches!(self, Self::HasMany | Self::ManyToMany)
	}
}

/// Relationship metadata for one attribute of a model.
///
/// # Examples
///
/// ```
/// use fabrik_core::model::{Relationship, RelationshipKind};
///
/// let post = Relationship::belongs_to("post", "Post", "post_id");
/// assert_eq!(post.kind, RelationshipKind::BelongsTo);
/// assert_eq!(post.foreign_key.as_deref(), Some("post_id"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
	/// Attribute name on the owning model (e.g. "author").
	pub name: String,
	/// Relationship kind.
	pub kind: RelationshipKind,
	/// Target model identifier (e.g. "Person").
	pub target: String,
	/// Key column. Owner side for `BelongsTo`, target side for `HasOne`/`HasMany`.
	pub foreign_key: Option<String>,
	/// Join table or join model for `ManyToMany`.
	pub through: Option<String>,
}

impl Relationship {
	/// Describes a single-owner relationship stored in `foreign_key`.
	pub fn belongs_to(
		name: impl Into<String>,
		target: impl Into<String>,
		foreign_key: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			kind: RelationshipKind::BelongsTo,
			target: target.into(),
			foreign_key: Some(foreign_key.into()),
			through: None,
		}
	}

	/// Describes a one-to-one relationship keyed on the target's `foreign_key`.
	pub fn has_one(
		name: impl Into<String>,
		target: impl Into<String>,
		foreign_key: impl Into<String>,
	) -> Self {
		Self {
			kind: RelationshipKind::HasOne,
			..Self::belongs_to(name, target, foreign_key)
		}
	}

	/// Describes a collection keyed on the target's `foreign_key`.
	pub fn has_many(
		name: impl Into<String>,
		target: impl Into<String>,
		foreign_key: impl Into<String>,
	) -> Self {
		Self {
			kind: RelationshipKind::HasMany,
			..Self::belongs_to(name, target, foreign_key)
		}
	}

	/// Describes a collection linked through `through`.
	pub fn many_to_many(
		name: impl Into<String>,
		target: impl Into<String>,
		through: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			kind: RelationshipKind::ManyToMany,
			target: target.into(),
			foreign_key: None,
			through: Some(through.into()),
		}
	}

	/// Returns true for single-owner ("belongs-to") relationships.
	pub fn is_single_owner(&self) -> bool {
		self.kind == RelationshipKind::BelongsTo
	}
}

/// Capability an object-model technology provides to be buildable.
///
/// Implementations decide what a record is, how it is stored and which of
/// its columns are guarded against bulk assignment. `assign` is always the
/// direct, unguarded setter.
pub trait ObjectModel {
	/// Live object handle.
	type Record: Clone + fmt::Debug;

	/// Creates a new, empty record of `model` carrying constructor defaults.
	fn instantiate(&self, model: &str) -> BuildResult<Self::Record>;

	/// Returns the model identifier of `record`.
	fn model_of<'r>(&self, record: &'r Self::Record) -> &'r str;

	/// Reads an attribute. Relationship attributes resolve to the related record.
	fn read(&self, record: &Self::Record, attribute: &str) -> Option<AttributeValue<Self::Record>>;

	/// Assigns an attribute directly, bypassing bulk-assignment guards.
	fn assign(
		&self,
		record: &mut Self::Record,
		attribute: &str,
		value: AttributeValue<Self::Record>,
	) -> BuildResult<()>;

	/// Persists the record. Failures are reported, never swallowed.
	fn save(&self, record: &mut Self::Record) -> BuildResult<()>;

	/// Refreshes the record from the backing store.
	fn reload(&self, record: &mut Self::Record) -> BuildResult<()>;

	/// Returns true once the record exists in the backing store.
	fn is_persisted(&self, record: &Self::Record) -> bool;

	/// Returns the persisted identifier, if any.
	fn primary_key(&self, record: &Self::Record) -> Option<Value>;

	/// Returns true if the record has unsaved changes.
	fn is_changed(&self, record: &Self::Record) -> bool;

	/// Relationship metadata for `attribute` of `model`, `None` if it is a plain attribute.
	fn relationship(&self, model: &str, attribute: &str) -> Option<Relationship>;

	/// Column attributes of the record, the set eligible for bulk creation.
	fn columns(&self, record: &Self::Record) -> serde_json::Map<String, Value>;

	/// Builds a record inside `parent`'s `collection` without touching storage.
	fn build_in_collection(
		&self,
		parent: &Self::Record,
		collection: &str,
	) -> BuildResult<Self::Record>;

	/// Creates and links a record through `parent`'s `collection` from bulk
	/// attributes. Guarded columns may be dropped by the host.
	fn create_in_collection(
		&self,
		parent: &Self::Record,
		collection: &str,
		columns: serde_json::Map<String, Value>,
	) -> BuildResult<Self::Record>;

	/// Creates and links a fully populated record through `parent`'s
	/// `collection` in a single write.
	///
	/// Hosts that cannot do this return `Ok(None)` (the default) and the
	/// caller falls back to [`create_in_collection`](Self::create_in_collection).
	fn create_populated_in_collection(
		&self,
		parent: &Self::Record,
		collection: &str,
		record: &Self::Record,
	) -> BuildResult<Option<Self::Record>> {
		let _ = (parent, collection, record);
		Ok(None)
	}
}
