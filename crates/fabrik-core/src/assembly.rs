//! Attribute resolution for one record.
//!
//! An [`Assembly`] is a single-use builder session: it pairs one freshly
//! constructed record with one blueprint evaluation and remembers exactly
//! which attributes were assigned, in order.

use serde_json::Value;

use crate::adapter::PersistenceAdapter;
use crate::blueprint::{Association, Generator};
use crate::error::{BuildError, BuildResult};
use crate::model::ObjectModel;
use crate::value::{AttributeMap, AttributeValue};

/// Builds associated records on behalf of an assembly.
///
/// Implemented by the construction entry points, which decide between a
/// saved and an unsaved association by reading the current persistence
/// scope themselves.
pub trait AssociationBuilder<R> {
	/// Builds a `model` record from the association's blueprint and overrides.
	fn build_association(&self, model: &str, association: &Association) -> BuildResult<R>;
}

/// A record under construction and the attributes assigned to it.
#[derive(Debug, Clone)]
pub struct Assembly<R> {
	record: R,
	assigned: AttributeMap<R>,
}

impl<R: Clone> Assembly<R> {
	/// Resolves `entries` onto `record`.
	///
	/// `overrides` are assigned first, in the caller's order, and suppress
	/// blueprint entries of the same name. Entries then run in declaration
	/// order; an entry is skipped when its attribute was already assigned or
	/// when it names a relationship the record already has populated.
	///
	/// # Errors
	///
	/// Any generator, association or assignment failure is returned
	/// unchanged and aborts the resolution.
	pub fn run<M, B>(
		adapter: &PersistenceAdapter<'_, M>,
		builder: &B,
		record: R,
		entries: &[(String, Generator)],
		overrides: AttributeMap<R>,
	) -> BuildResult<Self>
	where
		M: ObjectModel<Record = R>,
		B: AssociationBuilder<R> + ?Sized,
	{
		let mut assembly = Self {
			record,
			assigned: AttributeMap::with_capacity(entries.len() + overrides.len()),
		};

		for (attribute, value) in overrides {
			assembly.assign(adapter.model(), attribute, value)?;
		}

		for (attribute, generator) in entries {
			if assembly.is_assigned(attribute) {
				continue;
			}
			if adapter.is_relationship(&assembly.record, attribute)
				&& is_present(adapter.model().read(&assembly.record, attribute))
			{
				tracing::trace!(attribute = %attribute, "association already populated, skipping");
				continue;
			}

			let value = match generator {
				Generator::Association(association) => AttributeValue::Record(
					assembly.build_association(adapter, builder, attribute, association)?,
				),
				generator => AttributeValue::Value(generator.generate_value()?),
			};
			assembly.assign(adapter.model(), attribute.clone(), value)?;
		}

		Ok(assembly)
	}

	fn build_association<M, B>(
		&self,
		adapter: &PersistenceAdapter<'_, M>,
		builder: &B,
		attribute: &str,
		association: &Association,
	) -> BuildResult<R>
	where
		M: ObjectModel<Record = R>,
		B: AssociationBuilder<R> + ?Sized,
	{
		let target = match association.target_model() {
			Some(model) => model.to_string(),
			None => adapter
				.target_type_of(&self.record, attribute)
				.ok_or_else(|| BuildError::UnknownAssociation {
					model: adapter.model().model_of(&self.record).to_string(),
					attribute: attribute.to_string(),
				})?,
		};
		builder.build_association(&target, association)
	}

	fn assign<M>(&mut self, model: &M, attribute: String, value: AttributeValue<R>) -> BuildResult<()>
	where
		M: ObjectModel<Record = R>,
	{
		tracing::trace!(attribute = %attribute, record = value.is_record(), "assigning attribute");
		model.assign(&mut self.record, &attribute, value.clone())?;
		self.assigned.insert(attribute, value);
		Ok(())
	}
}

impl<R> Assembly<R> {
	/// The record under construction.
	pub fn record(&self) -> &R {
		&self.record
	}

	/// Mutable access to the record under construction.
	pub fn record_mut(&mut self) -> &mut R {
		&mut self.record
	}

	/// Attributes the blueprint or the caller assigned, in assignment order.
	pub fn assigned_attributes(&self) -> &AttributeMap<R> {
		&self.assigned
	}

	/// Returns true if `attribute` was assigned during this session.
	pub fn is_assigned(&self, attribute: &str) -> bool {
		self.assigned.contains_key(attribute)
	}

	/// Swaps in the record the store actually created, keeping the assigned attributes.
	pub fn replace_record(&mut self, record: R) -> R {
		std::mem::replace(&mut self.record, record)
	}

	/// Ends the session and returns the record.
	pub fn into_record(self) -> R {
		self.record
	}

	/// Ends the session and returns the record with its assigned attributes.
	pub fn into_parts(self) -> (R, AttributeMap<R>) {
		(self.record, self.assigned)
	}
}

fn is_present<R>(value: Option<AttributeValue<R>>) -> bool {
	match value {
		None => false,
		Some(AttributeValue::Record(_)) => true,
		Some(AttributeValue::Value(Value::Null)) => false,
		Some(AttributeValue::Value(Value::Array(items))) => !items.is_empty(),
		Some(AttributeValue::Value(_)) => true,
	}
}
