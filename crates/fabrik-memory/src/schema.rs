//! Model schemas: columns, defaults, guards and relationships.

use std::collections::HashSet;

use fabrik_core::Relationship;
use indexmap::IndexMap;
use serde_json::Value;

/// How a relationship is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
	/// This model stores the owner's id in `foreign_key`.
	BelongsTo {
		/// Owner model.
		target: String,
		/// Key column on this model.
		foreign_key: String,
	},
	/// Members store this record's id in `foreign_key`.
	HasMany {
		/// Member model.
		target: String,
		/// Key column on the member model.
		foreign_key: String,
	},
	/// Members are linked through rows of a join table.
	JoinTable {
		/// Member model.
		target: String,
		/// Join table name.
		table: String,
		/// Join column holding this record's id.
		owner_key: String,
		/// Join column holding the member's id.
		member_key: String,
	},
	/// Members are linked through records of a join model.
	Through {
		/// Member model.
		target: String,
		/// Join model.
		model: String,
		/// Join model column holding this record's id.
		owner_key: String,
		/// Join model column holding the member's id.
		member_key: String,
	},
}

impl Link {
	/// Model on the other side of the link.
	pub fn target(&self) -> &str {
		match self {
			Self::BelongsTo { target, .. }
			| Self::HasMany { target, .. }
			| Self::JoinTable { target, .. }
			| Self::Through { target, .. } => target,
		}
	}

	/// Returns true for links that hold a collection of members.
	pub fn is_collection(&self) -> bool {
		!matches!(self, Self::BelongsTo { .. })
	}

	pub(crate) fn to_relationship(&self, name: &str) -> Relationship {
		match self {
			Self::BelongsTo {
				target,
				foreign_key,
			} => Relationship::belongs_to(name, target, foreign_key),
			Self::HasMany {
				target,
				foreign_key,
			} => Relationship::has_many(name, target, foreign_key),
			Self::JoinTable { target, table, .. } => Relationship::many_to_many(name, target, table),
			Self::Through {
				target,
				model,
				member_key,
				..
			} => Relationship {
				foreign_key: Some(member_key.clone()),
				..Relationship::many_to_many(name, target, model)
			},
		}
	}
}

/// Schema of one model.
///
/// # Example
///
/// ```
/// use fabrik_memory::ModelSchema;
/// use serde_json::json;
///
/// let person = ModelSchema::new("Person")
///     .column("name")
///     .column_default("admin", json!(false))
///     .protected("password")
///     .has_many_through("posts", "Post", "Subscription", "subscriber_id", "post_id");
///
/// assert!(person.has_column("password"));
/// assert!(person.is_protected("password"));
/// ```
#[derive(Debug, Clone)]
pub struct ModelSchema {
	name: String,
	columns: IndexMap<String, Value>,
	protected: HashSet<String>,
	required: Vec<String>,
	links: IndexMap<String, Link>,
}

impl ModelSchema {
	/// Creates a schema with no columns.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			columns: IndexMap::new(),
			protected: HashSet::new(),
			required: Vec::new(),
			links: IndexMap::new(),
		}
	}

	/// Adds a column defaulting to `null`.
	pub fn column(self, name: impl Into<String>) -> Self {
		self.column_default(name, Value::Null)
	}

	/// Adds a column with a constructor default.
	pub fn column_default(mut self, name: impl Into<String>, default: Value) -> Self {
		self.columns.insert(name.into(), default);
		self
	}

	/// Adds a column that bulk assignment silently drops.
	pub fn protected(mut self, name: impl Into<String>) -> Self {
		let name = name.into();
		self.protected.insert(name.clone());
		self.column(name)
	}

	/// Saves fail while `column` is null or blank.
	pub fn required(mut self, column: impl Into<String>) -> Self {
		self.required.push(column.into());
		self
	}

	/// Declares a many-to-one relationship and its key column.
	pub fn belongs_to(
		mut self,
		name: impl Into<String>,
		target: impl Into<String>,
		foreign_key: impl Into<String>,
	) -> Self {
		let foreign_key = foreign_key.into();
		self.links.insert(
			name.into(),
			Link::BelongsTo {
				target: target.into(),
				foreign_key: foreign_key.clone(),
			},
		);
		self.column(foreign_key)
	}

	/// Declares a collection whose members store this record's id.
	pub fn has_many(
		mut self,
		name: impl Into<String>,
		target: impl Into<String>,
		foreign_key: impl Into<String>,
	) -> Self {
		self.links.insert(
			name.into(),
			Link::HasMany {
				target: target.into(),
				foreign_key: foreign_key.into(),
			},
		);
		self
	}

	/// Declares a collection linked through a join table.
	pub fn many_to_many(
		mut self,
		name: impl Into<String>,
		target: impl Into<String>,
		table: impl Into<String>,
		owner_key: impl Into<String>,
		member_key: impl Into<String>,
	) -> Self {
		self.links.insert(
			name.into(),
			Link::JoinTable {
				target: target.into(),
				table: table.into(),
				owner_key: owner_key.into(),
				member_key: member_key.into(),
			},
		);
		self
	}

	/// Declares a collection linked through records of a join model.
	pub fn has_many_through(
		mut self,
		name: impl Into<String>,
		target: impl Into<String>,
		model: impl Into<String>,
		owner_key: impl Into<String>,
		member_key: impl Into<String>,
	) -> Self {
		self.links.insert(
			name.into(),
			Link::Through {
				target: target.into(),
				model: model.into(),
				owner_key: owner_key.into(),
				member_key: member_key.into(),
			},
		);
		self
	}

	/// Model identifier.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Columns and their defaults, in declaration order.
	pub fn columns(&self) -> &IndexMap<String, Value> {
		&self.columns
	}

	/// Returns true if `name` is a column.
	pub fn has_column(&self, name: &str) -> bool {
		self.columns.contains_key(name)
	}

	/// Returns true if bulk assignment drops `column`.
	pub fn is_protected(&self, column: &str) -> bool {
		self.protected.contains(column)
	}

	/// Columns that must be present to save.
	pub fn required_columns(&self) -> &[String] {
		&self.required
	}

	/// Relationship link for `name`.
	pub fn link(&self, name: &str) -> Option<&Link> {
		self.links.get(name)
	}

	/// All relationship links, in declaration order.
	pub fn links(&self) -> impl Iterator<Item = (&str, &Link)> {
		self.links.iter().map(|(name, link)| (name.as_str(), link))
	}

	/// The belongs-to relationship stored in `foreign_key` pointing at `target`.
	pub(crate) fn owner_link(&self, target: &str, foreign_key: &str) -> Option<&str> {
		self.links.iter().find_map(|(name, link)| match link {
			Link::BelongsTo {
				target: owner,
				foreign_key: key,
			} if owner == target && key == foreign_key => Some(name.as_str()),
			_ => None,
		})
	}
}
