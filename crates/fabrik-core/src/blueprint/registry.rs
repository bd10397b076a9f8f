//! Blueprint registry keyed by model identifier.
//!
//! A registry is a cheap handle: clones share the same storage, so a
//! factory and the closures it hands out see the same blueprints.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Blueprint, Generator};
use crate::error::{BuildError, BuildResult};

#[derive(Debug, Default)]
struct ModelBlueprints {
	master: Option<Blueprint>,
	named: HashMap<String, Blueprint>,
}

impl ModelBlueprints {
	fn is_empty(&self) -> bool {
		self.master.is_none() && self.named.is_empty()
	}
}

/// Shared registry of master and named blueprints.
#[derive(Debug, Clone, Default)]
pub struct BlueprintRegistry {
	models: Arc<RwLock<HashMap<String, ModelBlueprints>>>,
}

impl BlueprintRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers (or replaces) the master blueprint of `model`.
	///
	/// # Example
	///
	/// ```
	/// use fabrik_core::blueprint::{Blueprint, BlueprintRegistry};
	///
	/// let registry = BlueprintRegistry::new();
	/// registry.register("Person", Blueprint::new().set("name", "Fred"));
	/// assert!(registry.has_blueprint("Person"));
	/// ```
	pub fn register(&self, model: impl Into<String>, blueprint: Blueprint) {
		self.models
			.write()
			.entry(model.into())
			.or_default()
			.master = Some(blueprint);
	}

	/// Registers (or replaces) a named blueprint of `model`.
	pub fn register_named(
		&self,
		model: impl Into<String>,
		name: impl Into<String>,
		blueprint: Blueprint,
	) {
		self.models
			.write()
			.entry(model.into())
			.or_default()
			.named
			.insert(name.into(), blueprint);
	}

	/// Checks if a master blueprint is registered for `model`.
	pub fn has_blueprint(&self, model: &str) -> bool {
		self.models
			.read()
			.get(model)
			.is_some_and(|blueprints| blueprints.master.is_some())
	}

	/// Checks if the named blueprint is registered for `model`.
	pub fn has_named(&self, model: &str, name: &str) -> bool {
		self.models
			.read()
			.get(model)
			.is_some_and(|blueprints| blueprints.named.contains_key(name))
	}

	/// Returns the entries to evaluate for `model`.
	///
	/// A named blueprint contributes its entries first, followed by the
	/// master blueprint's. The entries are cloned out so no lock is held
	/// while they run.
	///
	/// # Errors
	///
	/// Returns [`BuildError::NoBlueprint`] when `model` has no master
	/// blueprint and none was named, and [`BuildError::NoNamedBlueprint`]
	/// when the named blueprint does not exist.
	pub fn resolve(&self, model: &str, name: Option<&str>) -> BuildResult<Vec<(String, Generator)>> {
		let models = self.models.read();
		let blueprints = models.get(model);
		let master = blueprints.and_then(|blueprints| blueprints.master.as_ref());

		let mut entries = Vec::new();
		match name {
			Some(name) => {
				let named = blueprints
					.and_then(|blueprints| blueprints.named.get(name))
					.ok_or_else(|| BuildError::NoNamedBlueprint {
						model: model.to_string(),
						name: name.to_string(),
					})?;
				entries.extend_from_slice(named.entries());
			}
			None if master.is_none() => return Err(BuildError::NoBlueprint(model.to_string())),
			None => {}
		}
		if let Some(master) = master {
			entries.extend_from_slice(master.entries());
		}
		Ok(entries)
	}

	/// Removes every blueprint of `model`.
	pub fn clear_model(&self, model: &str) {
		self.models.write().remove(model);
	}

	/// Removes every blueprint.
	pub fn clear(&self) {
		self.models.write().clear();
	}

	/// Returns the models with at least one blueprint, sorted.
	pub fn model_ids(&self) -> Vec<String> {
		let mut models: Vec<String> = self
			.models
			.read()
			.iter()
			.filter(|(_, blueprints)| !blueprints.is_empty())
			.map(|(model, _)| model.clone())
			.collect();
		models.sort();
		models
	}

	/// Returns the number of models with blueprints.
	pub fn len(&self) -> usize {
		self.model_ids().len()
	}

	/// Returns true if no blueprints are registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
