//! Construction entry points: `make`, `make_unsaved` and `plan`.
//!
//! A [`Factory`] composes a host [`ObjectModel`] with a blueprint registry
//! and applies the persistence policy around each resolution:
//!
//! | Operation      | Persistence                                   | Result         |
//! |----------------|-----------------------------------------------|----------------|
//! | `make`         | save + reload, unless persistence is suppressed | live record  |
//! | `make_unsaved` | suppressed for the whole object graph         | unsaved record |
//! | `plan`         | associations only, the record is discarded    | flat [`Plan`]  |

use serde_json::Value;

use crate::adapter::PersistenceAdapter;
use crate::assembly::{Assembly, AssociationBuilder};
use crate::blueprint::{Association, Blueprint, BlueprintRegistry};
use crate::collection::CollectionConstruction;
use crate::error::BuildResult;
use crate::model::ObjectModel;
use crate::scope::{self, DepthGuard};
use crate::settings::FactorySettings;
use crate::value::{AttributeMap, AttributeValue, Plan};

/// Builds records of a host object model from registered blueprints.
///
/// # Example
///
/// ```ignore
/// use fabrik_core::prelude::*;
///
/// let factory = Factory::new(store);
/// factory.blueprint("Post", Blueprint::new().set("title", "Hello"));
/// factory.blueprint("Comment", Blueprint::new().association("post"));
///
/// let comment = factory.make("Comment")?;              // Comment and Post saved
/// let draft = factory.make_unsaved("Comment")?;        // nothing saved
/// let params = factory.plan("Comment")?;               // { post_id: 2 }
/// ```
#[derive(Debug)]
pub struct Factory<M> {
	model: M,
	blueprints: BlueprintRegistry,
	settings: FactorySettings,
}

impl<M: ObjectModel> Factory<M> {
	/// Creates a factory with default settings.
	pub fn new(model: M) -> Self {
		Self::with_settings(model, FactorySettings::default())
	}

	/// Creates a factory with explicit settings.
	pub fn with_settings(model: M, settings: FactorySettings) -> Self {
		Self {
			model,
			blueprints: BlueprintRegistry::new(),
			settings,
		}
	}

	/// Uses an existing (possibly shared) blueprint registry.
	pub fn with_registry(mut self, blueprints: BlueprintRegistry) -> Self {
		self.blueprints = blueprints;
		self
	}

	/// The host object model.
	pub fn model(&self) -> &M {
		&self.model
	}

	/// The active settings.
	pub fn settings(&self) -> &FactorySettings {
		&self.settings
	}

	/// The blueprint registry.
	pub fn blueprints(&self) -> &BlueprintRegistry {
		&self.blueprints
	}

	/// A persistence adapter over the host model.
	pub fn adapter(&self) -> PersistenceAdapter<'_, M> {
		PersistenceAdapter::new(&self.model)
	}

	/// Registers (or replaces) the master blueprint of `model`.
	pub fn blueprint(&self, model: impl Into<String>, blueprint: Blueprint) -> &Self {
		self.blueprints.register(model, blueprint);
		self
	}

	/// Registers (or replaces) a named blueprint of `model`.
	pub fn named_blueprint(
		&self,
		model: impl Into<String>,
		name: impl Into<String>,
		blueprint: Blueprint,
	) -> &Self {
		self.blueprints.register_named(model, name, blueprint);
		self
	}

	/// Removes every blueprint of `model`.
	pub fn clear_blueprints(&self, model: &str) {
		self.blueprints.clear_model(model);
	}

	/// Removes every blueprint.
	pub fn clear_all_blueprints(&self) {
		self.blueprints.clear();
	}

	/// Returns true if `model` has a master blueprint.
	pub fn has_blueprint(&self, model: &str) -> bool {
		self.blueprints.has_blueprint(model)
	}

	/// Models with at least one blueprint, sorted.
	pub fn model_ids(&self) -> Vec<String> {
		self.blueprints.model_ids()
	}

	/// Starts a construction of `model` that can be customised before it runs.
	pub fn construct(&self, model: impl Into<String>) -> Construction<'_, M> {
		Construction {
			factory: self,
			model: model.into(),
			blueprint: None,
			overrides: AttributeMap::new(),
		}
	}

	/// Builds and saves a `model` record from its master blueprint.
	pub fn make(&self, model: impl Into<String>) -> BuildResult<M::Record> {
		self.construct(model).make()
	}

	/// Builds a `model` record and its associations without saving any of them.
	pub fn make_unsaved(&self, model: impl Into<String>) -> BuildResult<M::Record> {
		self.construct(model).make_unsaved()
	}

	/// Plans a `model` record: attributes only, associations as foreign keys.
	pub fn plan(&self, model: impl Into<String>) -> BuildResult<Plan<M::Record>> {
		self.construct(model).plan()
	}

	/// Starts a construction inside `parent`'s `collection`.
	pub fn collection<'p>(
		&self,
		parent: &'p M::Record,
		collection: impl Into<String>,
	) -> CollectionConstruction<'_, 'p, M> {
		CollectionConstruction::new(self, parent, collection.into())
	}

	pub(crate) fn assemble(
		&self,
		record: M::Record,
		model: &str,
		blueprint: Option<&str>,
		overrides: AttributeMap<M::Record>,
	) -> BuildResult<Assembly<M::Record>> {
		let entries = self.blueprints.resolve(model, blueprint)?;
		Assembly::run(&self.adapter(), self, record, &entries, overrides)
	}

	pub(crate) fn enter(&self, model: &str) -> BuildResult<DepthGuard> {
		DepthGuard::enter(model, self.settings.max_depth)
	}

	/// Saves the record, then reloads it to pick up store-generated values.
	pub(crate) fn persist(&self, record: &mut M::Record) -> BuildResult<()> {
		self.model.save(record)?;
		if self.settings.reload_after_save {
			self.model.reload(record)?;
		}
		Ok(())
	}

	fn make_record(
		&self,
		model: &str,
		blueprint: Option<&str>,
		overrides: AttributeMap<M::Record>,
	) -> BuildResult<M::Record> {
		let _depth = self.enter(model)?;
		let record = self.model.instantiate(model)?;
		let mut assembly = self.assemble(record, model, blueprint, overrides)?;

		if scope::is_persistence_suppressed() {
			tracing::debug!(model = %model, "built unsaved record");
		} else {
			self.persist(assembly.record_mut())?;
			tracing::debug!(model = %model, "built and saved record");
		}
		Ok(assembly.into_record())
	}

	fn plan_record(
		&self,
		model: &str,
		blueprint: Option<&str>,
		overrides: AttributeMap<M::Record>,
	) -> BuildResult<Plan<M::Record>> {
		let _depth = self.enter(model)?;
		let record = self.model.instantiate(model)?;
		let assembly = self.assemble(record, model, blueprint, overrides)?;
		tracing::debug!(model = %model, "planned record");
		Ok(Plan::new(self.adapter().attributes_without_associations(&assembly)))
	}
}

impl<M: ObjectModel> AssociationBuilder<M::Record> for Factory<M> {
	fn build_association(&self, model: &str, association: &Association) -> BuildResult<M::Record> {
		let overrides = association
			.overrides()
			.iter()
			.map(|(attribute, value)| (attribute.clone(), AttributeValue::Value(value.clone())))
			.collect();
		self.make_record(model, association.blueprint_name(), overrides)
	}
}

/// A pending construction of one model.
///
/// # Example
///
/// ```ignore
/// let person = factory
///     .construct("Person")
///     .named("admin")
///     .with("password", "New")
///     .make()?;
/// ```
#[derive(Debug)]
pub struct Construction<'f, M: ObjectModel> {
	factory: &'f Factory<M>,
	model: String,
	blueprint: Option<String>,
	overrides: AttributeMap<M::Record>,
}

impl<'f, M: ObjectModel> Construction<'f, M> {
	/// Uses a named blueprint ahead of the master blueprint.
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

	/// Builds and saves the record (unless persistence is suppressed).
	pub fn make(self) -> BuildResult<M::Record> {
		self.make_with(|_| Ok(()))
	}

	/// Like [`make`](Self::make), then runs `block` on the finished record.
	///
	/// The block sees the record after its own save; anything it constructs
	/// follows the current persistence scope, not the record's state.
	pub fn make_with<F>(self, block: F) -> BuildResult<M::Record>
	where
		F: FnOnce(&mut M::Record) -> BuildResult<()>,
	{
		let mut record = self
			.factory
			.make_record(&self.model, self.blueprint.as_deref(), self.overrides)?;
		block(&mut record)?;
		Ok(record)
	}

	/// Builds the record and every association without saving anything.
	pub fn make_unsaved(self) -> BuildResult<M::Record> {
		self.make_unsaved_with(|_| Ok(()))
	}

	/// Like [`make_unsaved`](Self::make_unsaved), then runs `block` after
	/// the suppression scope has ended, so the block's constructions persist.
	pub fn make_unsaved_with<F>(self, block: F) -> BuildResult<M::Record>
	where
		F: FnOnce(&mut M::Record) -> BuildResult<()>,
	{
		let factory = self.factory;
		let mut record = scope::with_persistence_suppressed(|| {
			factory.make_record(&self.model, self.blueprint.as_deref(), self.overrides)
		})?;
		block(&mut record)?;
		Ok(record)
	}

	/// Resolves the blueprint and returns the flattened attributes.
	pub fn plan(self) -> BuildResult<Plan<M::Record>> {
		self.factory
			.plan_record(&self.model, self.blueprint.as_deref(), self.overrides)
	}

	/// Makes `count` records with the same overrides.
	pub fn make_batch(self, count: usize) -> BuildResult<Vec<M::Record>> {
		(0..count)
			.map(|_| {
				self.factory.make_record(
					&self.model,
					self.blueprint.as_deref(),
					self.overrides.clone(),
				)
			})
			.collect()
	}

	/// Plans `count` records with the same overrides.
	pub fn plan_batch(self, count: usize) -> BuildResult<Vec<Plan<M::Record>>> {
		(0..count)
			.map(|_| {
				self.factory.plan_record(
					&self.model,
					self.blueprint.as_deref(),
					self.overrides.clone(),
				)
			})
			.collect()
	}
}
