//! Minimal object model for unit tests.
//!
//! Posts have comments (has-many) and tags (many-to-many); comments belong to
//! a post and to an author. The `secret` column is dropped by bulk creation.

use std::cell::{Cell, RefCell};

use indexmap::IndexMap;
use serde_json::{Value, json};

use crate::error::{BuildError, BuildResult};
use crate::model::{ObjectModel, Relationship};
use crate::value::AttributeValue;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MockRecord {
	pub model: String,
	pub id: Option<i64>,
	pub values: IndexMap<String, AttributeValue<MockRecord>>,
	pub dirty: bool,
}

impl MockRecord {
	pub fn get(&self, attribute: &str) -> Option<&Value> {
		self.values.get(attribute).and_then(AttributeValue::as_value)
	}

	pub fn related(&self, attribute: &str) -> Option<&MockRecord> {
		self.values.get(attribute).and_then(AttributeValue::as_record)
	}
}

#[derive(Debug, Default)]
pub(crate) struct MockModel {
	pub next_id: Cell<i64>,
	/// Every storage write, as "verb:Model".
	pub writes: RefCell<Vec<String>>,
	/// Saves of this model fail validation.
	pub reject: Option<String>,
	/// Collection creation accepts fully populated records.
	pub direct_create: bool,
}

impl MockModel {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn writes(&self) -> Vec<String> {
		self.writes.borrow().clone()
	}

	fn persist(&self, verb: &str, record: &mut MockRecord) -> BuildResult<()> {
		if self.reject.as_deref() == Some(record.model.as_str()) {
			return Err(BuildError::Validation {
				model: record.model.clone(),
				message: "rejected".to_string(),
			});
		}
		if record.id.is_none() {
			self.next_id.set(self.next_id.get() + 1);
			record.id = Some(self.next_id.get());
		}
		record.dirty = false;
		self.writes.borrow_mut().push(format!("{verb}:{}", record.model));
		Ok(())
	}
}

impl ObjectModel for MockModel {
	type Record = MockRecord;

	fn instantiate(&self, model: &str) -> BuildResult<MockRecord> {
		match model {
			"Post" | "Comment" | "Person" | "Tag" => Ok(MockRecord {
				model: model.to_string(),
				id: None,
				values: IndexMap::new(),
				dirty: false,
			}),
			other => Err(BuildError::UnknownModel(other.to_string())),
		}
	}

	fn model_of<'r>(&self, record: &'r MockRecord) -> &'r str {
		&record.model
	}

	fn read(&self, record: &MockRecord, attribute: &str) -> Option<AttributeValue<MockRecord>> {
		record.values.get(attribute).cloned()
	}

	fn assign(
		&self,
		record: &mut MockRecord,
		attribute: &str,
		value: AttributeValue<MockRecord>,
	) -> BuildResult<()> {
		if attribute == "id" {
			record.id = value.as_value().and_then(Value::as_i64);
			return Ok(());
		}
		if record.values.get(attribute) != Some(&value) {
			record.dirty = true;
		}
		record.values.insert(attribute.to_string(), value);
		Ok(())
	}

	fn save(&self, record: &mut MockRecord) -> BuildResult<()> {
		self.persist("save", record)
	}

	fn reload(&self, record: &mut MockRecord) -> BuildResult<()> {
		self.writes
			.borrow_mut()
			.push(format!("reload:{}", record.model));
		Ok(())
	}

	fn is_persisted(&self, record: &MockRecord) -> bool {
		record.id.is_some()
	}

	fn primary_key(&self, record: &MockRecord) -> Option<Value> {
		record.id.map(Value::from)
	}

	fn is_changed(&self, record: &MockRecord) -> bool {
		record.dirty
	}

	fn relationship(&self, model: &str, attribute: &str) -> Option<Relationship> {
		match (model, attribute) {
			("Comment", "post") => Some(Relationship::belongs_to("post", "Post", "post_id")),
			("Comment", "author") => Some(Relationship::belongs_to("author", "Person", "author_id")),
			("Post", "comments") => Some(Relationship::has_many("comments", "Comment", "post_id")),
			("Post", "tags") => Some(Relationship::many_to_many("tags", "Tag", "posts_tags")),
			_ => None,
		}
	}

	fn columns(&self, record: &MockRecord) -> serde_json::Map<String, Value> {
		let mut columns: serde_json::Map<String, Value> = record
			.values
			.iter()
			.filter_map(|(name, value)| Some((name.clone(), value.as_value()?.clone())))
			.collect();
		columns.insert("id".to_string(), json!(record.id));
		columns
	}

	fn build_in_collection(&self, parent: &MockRecord, collection: &str) -> BuildResult<MockRecord> {
		let mut record = match collection {
			"comments" => self.instantiate("Comment")?,
			"tags" => self.instantiate("Tag")?,
			other => return Err(BuildError::Persistence(format!("no collection {other}"))),
		};
		if collection == "comments" {
			record
				.values
				.insert("post".to_string(), AttributeValue::Record(parent.clone()));
		}
		Ok(record)
	}

	fn create_in_collection(
		&self,
		parent: &MockRecord,
		collection: &str,
		columns: serde_json::Map<String, Value>,
	) -> BuildResult<MockRecord> {
		let mut record = self.build_in_collection(parent, collection)?;
		for (name, value) in columns {
			if name == "secret" {
				continue;
			}
			if name == "id" {
				record.id = value.as_i64();
			} else {
				record.values.insert(name, AttributeValue::Value(value));
			}
		}
		self.persist("create", &mut record)?;
		Ok(record)
	}

	fn create_populated_in_collection(
		&self,
		parent: &MockRecord,
		collection: &str,
		record: &MockRecord,
	) -> BuildResult<Option<MockRecord>> {
		if !self.direct_create {
			return Ok(None);
		}
		let mut created = self.build_in_collection(parent, collection)?;
		created.values.extend(record.values.clone());
		self.persist("create_populated", &mut created)?;
		Ok(Some(created))
	}
}
