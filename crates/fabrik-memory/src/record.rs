//! Records held by the in-memory store.

use indexmap::IndexMap;
use serde_json::Value;

/// A live record: column values, loaded owners and pending collection members.
///
/// Records are plain values. Two handles to the same stored row only agree
/// after a [`reload`](fabrik_core::ObjectModel::reload).
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
	pub(crate) model: String,
	pub(crate) id: Option<i64>,
	pub(crate) columns: IndexMap<String, Value>,
	pub(crate) owners: IndexMap<String, MemoryRecord>,
	pub(crate) pending: IndexMap<String, Vec<MemoryRecord>>,
	/// Key of the stored row, `None` until the first save.
	pub(crate) stored_id: Option<i64>,
	pub(crate) changed: bool,
}

impl MemoryRecord {
	pub(crate) fn new(model: impl Into<String>, columns: IndexMap<String, Value>) -> Self {
		Self {
			model: model.into(),
			id: None,
			columns,
			owners: IndexMap::new(),
			pending: IndexMap::new(),
			stored_id: None,
			changed: false,
		}
	}

	/// Model identifier.
	pub fn model(&self) -> &str {
		&self.model
	}

	/// Id, `None` until the first save unless assigned explicitly.
	pub fn id(&self) -> Option<i64> {
		self.id
	}

	/// Value of a column.
	pub fn get(&self, column: &str) -> Option<&Value> {
		self.columns.get(column)
	}

	/// String value of a column.
	pub fn get_str(&self, column: &str) -> Option<&str> {
		self.get(column).and_then(Value::as_str)
	}

	/// Owner record loaded into a belongs-to relationship.
	pub fn owner(&self, relationship: &str) -> Option<&MemoryRecord> {
		self.owners.get(relationship)
	}

	/// Column values in declaration order.
	pub fn columns(&self) -> &IndexMap<String, Value> {
		&self.columns
	}

	/// Returns true once the record has been saved.
	pub fn is_persisted(&self) -> bool {
		self.stored_id.is_some()
	}

	/// Returns true if the record has unsaved changes.
	pub fn is_changed(&self) -> bool {
		self.changed
	}

	pub(crate) fn set_column(&mut self, column: &str, value: Value) {
		if self.columns.get(column) != Some(&value) {
			self.changed = true;
		}
		self.columns.insert(column.to_string(), value);
	}
}
