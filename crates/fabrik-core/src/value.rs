//! Attribute values and the ordered maps that carry them.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{BuildError, BuildResult};

/// A resolved attribute value: either plain data or a live related record.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue<R> {
	/// Plain column data.
	Value(Value),
	/// An associated record built or supplied for a relationship attribute.
	Record(R),
}

impl<R> AttributeValue<R> {
	/// Wraps anything convertible into a JSON value.
	pub fn value(value: impl Into<Value>) -> Self {
		Self::Value(value.into())
	}

	/// Returns the plain value, if this is not a record.
	pub fn as_value(&self) -> Option<&Value> {
		match self {
			Self::Value(value) => Some(value),
			Self::Record(_) => None,
		}
	}

	/// Returns the related record, if any.
	pub fn as_record(&self) -> Option<&R> {
		match self {
			Self::Record(record) => Some(record),
			Self::Value(_) => None,
		}
	}

	/// Consumes the value and returns the related record, if any.
	pub fn into_record(self) -> Option<R> {
		match self {
			Self::Record(record) => Some(record),
			Self::Value(_) => None,
		}
	}

	/// Returns true if this holds a related record.
	pub fn is_record(&self) -> bool {
		matches!(self, Self::Record(_))
	}

	/// Returns true for a missing value (`null`).
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Value(Value::Null))
	}
}

impl<R> From<Value> for AttributeValue<R> {
	fn from(value: Value) -> Self {
		Self::Value(value)
	}
}

/// Attribute name to value, in assignment order.
pub type AttributeMap<R> = IndexMap<String, AttributeValue<R>>;

/// The flattened attribute map returned by `plan`.
///
/// Single-owner associations have already been replaced by their foreign
/// keys. Anything else the blueprint assigned is carried as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan<R> {
	attributes: AttributeMap<R>,
}

impl<R> Plan<R> {
	pub(crate) fn new(attributes: AttributeMap<R>) -> Self {
		Self { attributes }
	}

	/// Returns the value planned for `attribute`.
	pub fn get(&self, attribute: &str) -> Option<&AttributeValue<R>> {
		self.attributes.get(attribute)
	}

	/// Returns the plain value planned for `attribute`.
	pub fn value(&self, attribute: &str) -> Option<&Value> {
		self.get(attribute).and_then(AttributeValue::as_value)
	}

	/// Returns true if the plan contains `attribute`.
	pub fn contains(&self, attribute: &str) -> bool {
		self.attributes.contains_key(attribute)
	}

	/// Attribute names in assignment order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.attributes.keys().map(String::as_str)
	}

	/// Number of planned attributes.
	pub fn len(&self) -> usize {
		self.attributes.len()
	}

	/// Returns true if nothing was planned.
	pub fn is_empty(&self) -> bool {
		self.attributes.is_empty()
	}

	/// Returns the underlying ordered map.
	pub fn attributes(&self) -> &AttributeMap<R> {
		&self.attributes
	}

	/// Consumes the plan and returns the underlying ordered map.
	pub fn into_attributes(self) -> AttributeMap<R> {
		self.attributes
	}

	/// Converts the plan into request-shaped JSON.
	///
	/// # Errors
	///
	/// Returns [`BuildError::UnflattenedRecord`] when an attribute still holds
	/// a live record, e.g. a has-many collection assigned by the blueprint.
	pub fn into_json(self) -> BuildResult<serde_json::Map<String, Value>> {
		self.attributes
			.into_iter()
			.map(|(name, value)| match value {
				AttributeValue::Value(value) => Ok((name, value)),
				AttributeValue::Record(_) => Err(BuildError::UnflattenedRecord(name)),
			})
			.collect()
	}
}
