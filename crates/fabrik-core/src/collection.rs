//! Construction inside a parent's collection relationship.
//!
//! `factory.collection(&post, "comments").make()` builds a comment already
//! linked to `post`, so the comment blueprint's own `post` association is
//! skipped rather than generating a second post.

use serde_json::Value;

use crate::assembly::Assembly;
use crate::error::{BuildError, BuildResult};
use crate::factory::Factory;
use crate::model::ObjectModel;
use crate::scope;
use crate::value::{AttributeMap, AttributeValue, Plan};

/// A pending construction through `parent`'s `collection`.
#[derive(Debug)]
pub struct CollectionConstruction<'f, 'p, M: ObjectModel> {
	factory: &'f Factory<M>,
	parent: &'p M::Record,
	collection: String,
	blueprint: Option<String>,
	overrides: AttributeMap<M::Record>,
}

impl<'f, 'p, M: ObjectModel> CollectionConstruction<'f, 'p, M> {
	pub(crate) fn new(factory: &'f Factory<M>, parent: &'p M::Record, collection: String) -> Self {
		Self {
			factory,
			parent,
			collection,
			blueprint: None,
			overrides: AttributeMap::new(),
		}
	}

	/// Uses a named blueprint of the collection's target model.
	pub fn named(mut self, blueprint: impl Into<String>) -> Self {
		self.blueprint = Some(blueprint.into());
		self
	}

	/// Overrides an attribute with a plain value.
	pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
		self.overrides
			.insert(attribute.into(), AttributeValue::Value(value.into()));
		self
	}

	/// Overrides a relationship attribute with an existing record.
	pub fn with_record(mut self, attribute: impl Into<String>, record: M::Record) -> Self {
		self.overrides
			.insert(attribute.into(), AttributeValue::Record(record));
		self
	}

	/// Builds a member of the collection and creates it through the parent.
	///
	/// Under suppressed persistence the member is only built, still linked
	/// to the parent, and nothing is written.
	pub fn make(self) -> BuildResult<M::Record> {
		self.make_with(|_| Ok(()))
	}

	/// Like [`make`](Self::make), then runs `block` on the created member.
	pub fn make_with<F>(self, block: F) -> BuildResult<M::Record>
	where
		F: FnOnce(&mut M::Record) -> BuildResult<()>,
	{
		let target = self.target()?;
		let depth = self.factory.enter(&target)?;
		let model = self.factory.model();

		let record = model.build_in_collection(self.parent, &self.collection)?;
		let mut assembly = self.factory.assemble(
			record,
			&target,
			self.blueprint.as_deref(),
			self.overrides,
		)?;

		if scope::is_persistence_suppressed() {
			tracing::debug!(collection = %self.collection, model = %target, "built unsaved collection member");
		} else {
			let created = create(self.factory, self.parent, &self.collection, &assembly)?;
			assembly.replace_record(created);
			tracing::debug!(collection = %self.collection, model = %target, "created collection member");
		}

		drop(depth);

		let mut record = assembly.into_record();
		block(&mut record)?;
		Ok(record)
	}

	/// Plans a member of the collection without creating it.
	pub fn plan(self) -> BuildResult<Plan<M::Record>> {
		let target = self.target()?;
		let _depth = self.factory.enter(&target)?;

		let record = self
			.factory
			.model()
			.build_in_collection(self.parent, &self.collection)?;
		let assembly = self.factory.assemble(
			record,
			&target,
			self.blueprint.as_deref(),
			self.overrides,
		)?;
		Ok(Plan::new(
			self.factory.adapter().attributes_without_associations(&assembly),
		))
	}

	fn target(&self) -> BuildResult<String> {
		self.factory
			.adapter()
			.relationship(self.parent, &self.collection)
			.filter(|relationship| relationship.kind.is_collection())
			.map(|relationship| relationship.target)
			.ok_or_else(|| BuildError::NotACollection {
				model: self.factory.model().model_of(self.parent).to_string(),
				collection: self.collection.clone(),
			})
	}
}

/// Creates the assembled record through the parent's collection.
///
/// Hosts that accept a fully populated record create it in a single write.
/// Otherwise the record's columns go through the guarded bulk path; any
/// explicitly assigned column the store dropped or altered is assigned
/// again directly, and the record is saved a second time only if that
/// changed something.
fn create<M: ObjectModel>(
	factory: &Factory<M>,
	parent: &M::Record,
	collection: &str,
	assembly: &Assembly<M::Record>,
) -> BuildResult<M::Record> {
	let model = factory.model();

	if let Some(created) = model.create_populated_in_collection(parent, collection, assembly.record())? {
		return Ok(created);
	}

	let columns = model.columns(assembly.record());
	let mut created = model.create_in_collection(parent, collection, columns.clone())?;
	let stored = model.columns(&created);

	for (column, value) in columns {
		if !assembly.is_assigned(&column) || stored.get(&column) == Some(&value) {
			continue;
		}
		tracing::trace!(column = %column, "restoring guarded column");
		model.assign(&mut created, &column, AttributeValue::Value(value))?;
	}

	if model.is_changed(&created) {
		factory.persist(&mut created)?;
	}
	Ok(created)
}
