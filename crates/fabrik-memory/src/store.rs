//! The in-memory store and its [`ObjectModel`] implementation.
//!
//! Tables are keyed by model identifier and hold rows by auto-incremented
//! id. Join tables hold plain key rows. All state sits behind one
//! `parking_lot::RwLock`, so clones of a [`MemoryStore`] share data.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use fabrik_core::{AttributeValue, BuildError, BuildResult, ObjectModel, Relationship};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;

use crate::record::MemoryRecord;
use crate::schema::{Link, ModelSchema};

type Row = IndexMap<String, Value>;

#[derive(Debug, Default)]
struct StoreState {
	schemas: IndexMap<String, ModelSchema>,
	tables: HashMap<String, BTreeMap<i64, Row>>,
	join_tables: HashMap<String, Vec<Row>>,
	next_ids: HashMap<String, i64>,
}

impl StoreState {
	/// Points every stored reference to `model` row `old` at `new`.
	fn rekey(&mut self, model: &str, old: i64, new: i64) {
		let Self {
			schemas,
			tables,
			join_tables,
			..
		} = self;
		let (old, new) = (Value::from(old), Value::from(new));
		let replace = |row: &mut Row, key: &String| {
			if row.get(key) == Some(&old) {
				row.insert(key.clone(), new.clone());
			}
		};

		for schema in schemas.values() {
			for (_, link) in schema.links() {
				match link {
					Link::BelongsTo {
						target,
						foreign_key,
					} if target == model => {
						for row in tables.get_mut(schema.name()).into_iter().flat_map(|rows| rows.values_mut()) {
							replace(row, foreign_key);
						}
					}
					Link::HasMany {
						target,
						foreign_key,
					} if schema.name() == model => {
						for row in tables.get_mut(target).into_iter().flat_map(|rows| rows.values_mut()) {
							replace(row, foreign_key);
						}
					}
					Link::JoinTable {
						target,
						table,
						owner_key,
						member_key,
					} => {
						for row in join_tables.get_mut(table).into_iter().flatten() {
							if schema.name() == model {
								replace(row, owner_key);
							}
							if target == model {
								replace(row, member_key);
							}
						}
					}
					_ => {}
				}
			}
		}
	}
}

/// Shared in-memory storage for records described by [`ModelSchema`]s.
///
/// # Example
///
/// ```
/// use fabrik_core::ObjectModel;
/// use fabrik_memory::{MemoryStore, ModelSchema};
///
/// let store = MemoryStore::new();
/// store.register(ModelSchema::new("Post").column("title"));
///
/// let mut post = store.instantiate("Post").unwrap();
/// store.save(&mut post).unwrap();
///
/// assert_eq!(post.id(), Some(1));
/// assert_eq!(store.count("Post"), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	state: Arc<RwLock<StoreState>>,
	direct_collection_create: bool,
}

impl MemoryStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Lets collection creation accept fully populated records in one write.
	pub fn with_direct_collection_create(mut self, enabled: bool) -> Self {
		self.direct_collection_create = enabled;
		self
	}

	/// Registers (or replaces) a model schema.
	pub fn register(&self, schema: ModelSchema) -> &Self {
		let mut state = self.state.write();
		state.tables.entry(schema.name().to_string()).or_default();
		state.schemas.insert(schema.name().to_string(), schema);
		self
	}

	/// Schema of `model`.
	pub fn schema(&self, model: &str) -> Option<ModelSchema> {
		self.state.read().schemas.get(model).cloned()
	}

	/// Number of stored `model` rows.
	pub fn count(&self, model: &str) -> usize {
		self.state
			.read()
			.tables
			.get(model)
			.map_or(0, BTreeMap::len)
	}

	/// Number of rows in a join table.
	pub fn join_count(&self, table: &str) -> usize {
		self.state.read().join_tables.get(table).map_or(0, Vec::len)
	}

	/// Loads a stored record.
	pub fn find(&self, model: &str, id: i64) -> BuildResult<MemoryRecord> {
		self.load(model, id).ok_or_else(|| {
			BuildError::Persistence(format!("{model} with id {id} not found"))
		})
	}

	/// Loads every stored `model` record in id order.
	pub fn all(&self, model: &str) -> Vec<MemoryRecord> {
		let state = self.state.read();
		state
			.tables
			.get(model)
			.map(|rows| {
				rows.iter()
					.map(|(id, row)| stored(model, *id, row))
					.collect()
			})
			.unwrap_or_default()
	}

	/// Loads the stored members of `parent`'s `collection`.
	pub fn members(&self, parent: &MemoryRecord, collection: &str) -> BuildResult<Vec<MemoryRecord>> {
		let link = self.collection_link(parent, collection)?;
		let Some(parent_id) = parent.stored_id else {
			return Ok(Vec::new());
		};
		Ok(self
			.member_ids(&link, parent_id)
			.into_iter()
			.filter_map(|id| self.load(link.target(), id))
			.collect())
	}

	/// Removes every stored row, keeping the schemas.
	pub fn truncate(&self) {
		let mut state = self.state.write();
		state.tables.values_mut().for_each(BTreeMap::clear);
		state.join_tables.clear();
		state.next_ids.clear();
	}

	fn schema_for(&self, model: &str) -> BuildResult<ModelSchema> {
		self.schema(model)
			.ok_or_else(|| BuildError::UnknownModel(model.to_string()))
	}

	fn load(&self, model: &str, id: i64) -> Option<MemoryRecord> {
		let state = self.state.read();
		let row = state.tables.get(model)?.get(&id)?;
		Some(stored(model, id, row))
	}

	fn collection_link(&self, parent: &MemoryRecord, collection: &str) -> BuildResult<Link> {
		self.schema_for(&parent.model)?
			.link(collection)
			.filter(|link| link.is_collection())
			.cloned()
			.ok_or_else(|| BuildError::NotACollection {
				model: parent.model.clone(),
				collection: collection.to_string(),
			})
	}

	fn member_ids(&self, link: &Link, parent_id: i64) -> Vec<i64> {
		let state = self.state.read();
		let owned_by = |row: &Row, key: &str| row.get(key).and_then(Value::as_i64) == Some(parent_id);
		match link {
			Link::BelongsTo { .. } => Vec::new(),
			Link::HasMany {
				target,
				foreign_key,
			} => state
				.tables
				.get(target)
				.into_iter()
				.flatten()
				.filter(|(_, row)| owned_by(row, foreign_key))
				.map(|(id, _)| *id)
				.collect(),
			Link::JoinTable {
				table,
				owner_key,
				member_key,
				..
			} => state
				.join_tables
				.get(table)
				.into_iter()
				.flatten()
				.filter(|row| owned_by(row, owner_key))
				.filter_map(|row| row.get(member_key).and_then(Value::as_i64))
				.collect(),
			Link::Through {
				model,
				owner_key,
				member_key,
				..
			} => state
				.tables
				.get(model)
				.into_iter()
				.flatten()
				.filter(|(_, row)| owned_by(row, owner_key))
				.filter_map(|(_, row)| row.get(member_key).and_then(Value::as_i64))
				.collect(),
		}
	}

	/// Stores the link between a saved parent and `member`, saving the member first if needed.
	fn link(&self, parent_id: i64, link: &Link, member: &mut MemoryRecord) -> BuildResult<()> {
		match link {
			Link::BelongsTo { .. } => Ok(()),
			Link::HasMany { foreign_key, .. } => {
				member.set_column(foreign_key, Value::from(parent_id));
				if member.changed || !member.is_persisted() {
					self.save(member)?;
				}
				Ok(())
			}
			Link::JoinTable {
				table,
				owner_key,
				member_key,
				..
			} => {
				let member_id = self.ensure_saved(member)?;
				let mut row = Row::new();
				row.insert(owner_key.clone(), Value::from(parent_id));
				row.insert(member_key.clone(), Value::from(member_id));
				self.state
					.write()
					.join_tables
					.entry(table.clone())
					.or_default()
					.push(row);
				Ok(())
			}
			Link::Through {
				model,
				owner_key,
				member_key,
				..
			} => {
				let member_id = self.ensure_saved(member)?;
				let mut join = self.instantiate(model)?;
				join.set_column(owner_key, Value::from(parent_id));
				join.set_column(member_key, Value::from(member_id));
				self.save(&mut join)
			}
		}
	}

	fn ensure_saved(&self, record: &mut MemoryRecord) -> BuildResult<i64> {
		match record.stored_id {
			Some(id) => Ok(id),
			None => {
				self.save(record)?;
				record
					.stored_id
					.ok_or_else(|| BuildError::Persistence(format!("{} was not saved", record.model)))
			}
		}
	}

	fn require_saved_parent(&self, parent: &MemoryRecord, collection: &str) -> BuildResult<i64> {
		parent.stored_id.ok_or_else(|| {
			BuildError::Persistence(format!(
				"cannot create through {}.{collection} while the parent is unsaved",
				parent.model
			))
		})
	}
}

fn stored(model: &str, id: i64, row: &Row) -> MemoryRecord {
	let mut record = MemoryRecord::new(model, row.clone());
	record.id = Some(id);
	record.stored_id = Some(id);
	record
}

fn is_blank(value: Option<&Value>) -> bool {
	match value {
		None | Some(Value::Null) => true,
		Some(Value::String(text)) => text.trim().is_empty(),
		Some(_) => false,
	}
}

impl ObjectModel for MemoryStore {
	type Record = MemoryRecord;

	fn instantiate(&self, model: &str) -> BuildResult<MemoryRecord> {
		let schema = self.schema_for(model)?;
		Ok(MemoryRecord::new(model, schema.columns().clone()))
	}

	fn model_of<'r>(&self, record: &'r MemoryRecord) -> &'r str {
		&record.model
	}

	fn read(&self, record: &MemoryRecord, attribute: &str) -> Option<AttributeValue<MemoryRecord>> {
		if attribute == "id" {
			return Some(AttributeValue::Value(record.id.into()));
		}
		let schema = self.schema(&record.model)?;
		match schema.link(attribute) {
			Some(Link::BelongsTo {
				target,
				foreign_key,
			}) => {
				if let Some(owner) = record.owners.get(attribute) {
					return Some(AttributeValue::Record(owner.clone()));
				}
				let id = record.columns.get(foreign_key)?.as_i64()?;
				self.load(target, id).map(AttributeValue::Record)
			}
			Some(link) => {
				let mut ids: Vec<Value> = record
					.stored_id
					.map(|id| self.member_ids(link, id))
					.unwrap_or_default()
					.into_iter()
					.map(Value::from)
					.collect();
				if let Some(pending) = record.pending.get(attribute) {
					ids.extend(pending.iter().map(|member| Value::from(member.id)));
				}
				Some(AttributeValue::Value(Value::Array(ids)))
			}
			None => record.columns.get(attribute).cloned().map(AttributeValue::Value),
		}
	}

	fn assign(
		&self,
		record: &mut MemoryRecord,
		attribute: &str,
		value: AttributeValue<MemoryRecord>,
	) -> BuildResult<()> {
		if attribute == "id" {
			let id = value.as_value().and_then(Value::as_i64);
			if record.id != id {
				record.id = id;
				record.changed = true;
			}
			return Ok(());
		}
		let schema = self.schema_for(&record.model)?;
		match (schema.link(attribute), value) {
			(Some(Link::BelongsTo { foreign_key, .. }), AttributeValue::Record(owner)) => {
				record.set_column(foreign_key, owner.id.into());
				record.owners.insert(attribute.to_string(), owner);
				record.changed = true;
			}
			(Some(Link::BelongsTo { foreign_key, .. }), AttributeValue::Value(id)) => {
				record.set_column(foreign_key, id);
				record.owners.shift_remove(attribute);
			}
			(Some(link), AttributeValue::Record(member)) => {
				tracing::trace!(collection = %attribute, target = %link.target(), "queueing collection member");
				record
					.pending
					.entry(attribute.to_string())
					.or_default()
					.push(member);
				record.changed = true;
			}
			(Some(link), AttributeValue::Value(Value::Array(ids))) => {
				let mut members = Vec::with_capacity(ids.len());
				for id in ids {
					let id = id.as_i64().ok_or_else(|| BuildError::UnknownAttribute {
						model: record.model.clone(),
						attribute: attribute.to_string(),
					})?;
					members.push(self.find(link.target(), id)?);
				}
				record.pending.insert(attribute.to_string(), members);
				record.changed = true;
			}
			(Some(_), AttributeValue::Value(_)) => {
				return Err(BuildError::Persistence(format!(
					"{}.{attribute} expects records or a list of ids",
					record.model
				)));
			}
			(None, AttributeValue::Value(value)) if schema.has_column(attribute) => {
				record.set_column(attribute, value);
			}
			(None, _) => {
				return Err(BuildError::UnknownAttribute {
					model: record.model.clone(),
					attribute: attribute.to_string(),
				});
			}
		}
		Ok(())
	}

	fn save(&self, record: &mut MemoryRecord) -> BuildResult<()> {
		let schema = self.schema_for(&record.model)?;

		let owner_names: Vec<String> = record.owners.keys().cloned().collect();
		for name in owner_names {
			let Some(Link::BelongsTo { foreign_key, .. }) = schema.link(&name) else {
				continue;
			};
			if let Some(owner) = record.owners.get_mut(&name) {
				if !owner.is_persisted() {
					self.save(owner)?;
				}
				let owner_id = owner.id;
				record.set_column(foreign_key, owner_id.into());
			}
		}

		for column in schema.required_columns() {
			if is_blank(record.columns.get(column)) {
				return Err(BuildError::Validation {
					model: record.model.clone(),
					message: format!("{column} can't be blank"),
				});
			}
		}

		let id = {
			let mut state = self.state.write();
			let next = state.next_ids.entry(record.model.clone()).or_insert(0);
			let id = match record.id {
				Some(id) => {
					*next = (*next).max(id);
					id
				}
				None => {
					*next += 1;
					*next
				}
			};
			let rows = state.tables.entry(record.model.clone()).or_default();
			if record.stored_id != Some(id) && rows.contains_key(&id) {
				return Err(BuildError::Persistence(format!(
					"{} with id {id} already exists",
					record.model
				)));
			}
			rows.insert(id, record.columns.clone());
			if let Some(previous) = record.stored_id.filter(|previous| *previous != id) {
				rows.remove(&previous);
				state.rekey(&record.model, previous, id);
				tracing::debug!(model = %record.model, from = previous, to = id, "moved record");
			}
			id
		};
		record.id = Some(id);
		record.stored_id = Some(id);
		record.changed = false;
		tracing::debug!(model = %record.model, id, "saved record");

		let pending = std::mem::take(&mut record.pending);
		for (collection, members) in pending {
			let Some(link) = schema.link(&collection) else {
				continue;
			};
			for mut member in members {
				self.link(id, link, &mut member)?;
			}
		}
		Ok(())
	}

	fn reload(&self, record: &mut MemoryRecord) -> BuildResult<()> {
		let id = record.stored_id.ok_or_else(|| {
			BuildError::Persistence(format!("cannot reload an unsaved {}", record.model))
		})?;
		let fresh = self.find(&record.model, id)?;
		let schema = self.schema_for(&record.model)?;

		record.id = Some(id);
		record.columns = fresh.columns;
		let columns = &record.columns;
		record.owners.retain(|name, owner| match schema.link(name) {
			Some(Link::BelongsTo { foreign_key, .. }) => {
				owner.id.is_some() && columns.get(foreign_key).and_then(Value::as_i64) == owner.id
			}
			_ => false,
		});
		record.changed = false;
		Ok(())
	}

	fn is_persisted(&self, record: &MemoryRecord) -> bool {
		record.is_persisted()
	}

	fn primary_key(&self, record: &MemoryRecord) -> Option<Value> {
		record.stored_id.map(Value::from)
	}

	fn is_changed(&self, record: &MemoryRecord) -> bool {
		record.changed
	}

	fn relationship(&self, model: &str, attribute: &str) -> Option<Relationship> {
		let state = self.state.read();
		state
			.schemas
			.get(model)?
			.link(attribute)
			.map(|link| link.to_relationship(attribute))
	}

	fn columns(&self, record: &MemoryRecord) -> serde_json::Map<String, Value> {
		let mut columns: serde_json::Map<String, Value> = record
			.columns
			.iter()
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect();
		columns.insert("id".to_string(), record.id.into());
		columns
	}

	fn build_in_collection(
		&self,
		parent: &MemoryRecord,
		collection: &str,
	) -> BuildResult<MemoryRecord> {
		let link = self.collection_link(parent, collection)?;
		let mut member = self.instantiate(link.target())?;

		if let Link::HasMany { foreign_key, .. } = &link {
			let member_schema = self.schema_for(link.target())?;
			match member_schema.owner_link(&parent.model, foreign_key) {
				Some(owner) => {
					let owner = owner.to_string();
					self.assign(&mut member, &owner, AttributeValue::Record(parent.clone()))?;
				}
				None => member.set_column(foreign_key, parent.id.into()),
			}
		}
		Ok(member)
	}

	fn create_in_collection(
		&self,
		parent: &MemoryRecord,
		collection: &str,
		columns: serde_json::Map<String, Value>,
	) -> BuildResult<MemoryRecord> {
		let parent_id = self.require_saved_parent(parent, collection)?;
		let link = self.collection_link(parent, collection)?;
		let schema = self.schema_for(link.target())?;
		let mut member = self.build_in_collection(parent, collection)?;

		for (column, value) in columns {
			if column == "id" {
				continue;
			}
			if schema.is_protected(&column) {
				tracing::trace!(model = %schema.name(), column = %column, "dropping protected column");
				continue;
			}
			if !schema.has_column(&column) {
				return Err(BuildError::UnknownAttribute {
					model: schema.name().to_string(),
					attribute: column,
				});
			}
			member.set_column(&column, value);
		}

		self.save(&mut member)?;
		self.link(parent_id, &link, &mut member)?;
		Ok(member)
	}

	fn create_populated_in_collection(
		&self,
		parent: &MemoryRecord,
		collection: &str,
		record: &MemoryRecord,
	) -> BuildResult<Option<MemoryRecord>> {
		if !self.direct_collection_create {
			return Ok(None);
		}
		let parent_id = self.require_saved_parent(parent, collection)?;
		let link = self.collection_link(parent, collection)?;

		let mut member = record.clone();
		self.save(&mut member)?;
		self.link(parent_id, &link, &mut member)?;
		Ok(Some(member))
	}
}
