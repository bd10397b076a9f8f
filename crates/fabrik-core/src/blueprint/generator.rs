//! Attribute generators.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde_json::Value;

use super::faker::{FakerType, generate_fake};
use crate::error::{BuildError, BuildResult};

type LazyFn = dyn Fn() -> BuildResult<Value> + Send + Sync;
type SequenceFn = dyn Fn(u64) -> Value + Send + Sync;

/// Produces the value of one blueprint attribute.
///
/// Generators are evaluated eagerly, in declaration order, once per
/// construction. `Association` is the only kind that builds other objects.
#[derive(Clone)]
pub enum Generator {
	/// A fixed value.
	Constant(Value),
	/// A zero-argument producer evaluated at resolution time.
	Lazy(Arc<LazyFn>),
	/// Builds the related object through its own blueprint.
	Association(Association),
	/// Numbered values from a counter shared by every clone of the generator.
	Sequence(Sequence),
	/// Fake data.
	Fake(FakerType),
}

impl Generator {
	/// A fixed value.
	pub fn constant(value: impl Into<Value>) -> Self {
		Self::Constant(value.into())
	}

	/// An infallible producer.
	pub fn lazy<V, F>(f: F) -> Self
	where
		V: Into<Value>,
		F: Fn() -> V + Send + Sync + 'static,
	{
		Self::Lazy(Arc::new(move || Ok(f().into())))
	}

	/// A fallible producer. Its error aborts the whole construction.
	pub fn try_lazy<F>(f: F) -> Self
	where
		F: Fn() -> BuildResult<Value> + Send + Sync + 'static,
	{
		Self::Lazy(Arc::new(f))
	}

	/// Builds the related object using the relationship's target model.
	pub fn association() -> Self {
		Self::Association(Association::new())
	}

	/// Numbered values, starting at 1.
	pub fn sequence<V, F>(f: F) -> Self
	where
		V: Into<Value>,
		F: Fn(u64) -> V + Send + Sync + 'static,
	{
		Self::Sequence(Sequence::new(f))
	}

	/// Fake data of the given kind.
	pub fn fake(faker: FakerType) -> Self {
		Self::Fake(faker)
	}

	/// Returns the association reference, if this generator builds an object.
	pub fn as_association(&self) -> Option<&Association> {
		match self {
			Self::Association(association) => Some(association),
			_ => None,
		}
	}

	/// Evaluates a generator that produces plain data.
	///
	/// Associations build records and are resolved by the assembly instead.
	pub(crate) fn generate_value(&self) -> BuildResult<Value> {
		match self {
			Self::Constant(value) => Ok(value.clone()),
			Self::Lazy(f) => f(),
			Self::Sequence(sequence) => Ok(sequence.next_value()),
			Self::Fake(faker) => Ok(generate_fake(*faker)),
			Self::Association(_) => Err(BuildError::Generator(
				"association generators produce records, not values".to_string(),
			)),
		}
	}
}

impl fmt::Debug for Generator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
			Self::Lazy(_) => f.write_str("Lazy(..)"),
			Self::Association(association) => {
				f.debug_tuple("Association").field(association).finish()
			}
			Self::Sequence(sequence) => f.debug_tuple("Sequence").field(sequence).finish(),
			Self::Fake(faker) => f.debug_tuple("Fake").field(faker).finish(),
		}
	}
}

impl From<Value> for Generator {
	fn from(value: Value) -> Self {
		Self::Constant(value)
	}
}

impl From<Association> for Generator {
	fn from(association: Association) -> Self {
		Self::Association(association)
	}
}

/// Reference to another model's blueprint.
///
/// # Example
///
/// ```
/// use fabrik_core::blueprint::Association;
///
/// // Comment.author is a Person built from the "admin" blueprint.
/// let author = Association::new()
///     .model("Person")
///     .named("admin")
///     .with("name", "Fred");
/// assert_eq!(author.target_model(), Some("Person"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Association {
	model: Option<String>,
	blueprint: Option<String>,
	overrides: IndexMap<String, Value>,
}

impl Association {
	/// Builds the relationship's target model with its master blueprint.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds `model` instead of the relationship's declared target.
	pub fn model(mut self, model: impl Into<String>) -> Self {
		self.model = Some(model.into());
		self
	}

	/// Uses a named blueprint of the target model.
	pub fn named(mut self, blueprint: impl Into<String>) -> Self {
		self.blueprint = Some(blueprint.into());
		self
	}

	/// Overrides one attribute of the related object.
	pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
		self.overrides.insert(attribute.into(), value.into());
		self
	}

	/// Explicit target model, if any.
	pub fn target_model(&self) -> Option<&str> {
		self.model.as_deref()
	}

	/// Named blueprint, if any.
	pub fn blueprint_name(&self) -> Option<&str> {
		self.blueprint.as_deref()
	}

	/// Attribute overrides for the related object.
	pub fn overrides(&self) -> &IndexMap<String, Value> {
		&self.overrides
	}
}

/// Auto-incrementing value source.
#[derive(Clone)]
pub struct Sequence {
	counter: Arc<AtomicU64>,
	format: Arc<SequenceFn>,
}

impl Sequence {
	/// Creates a sequence whose first value is `f(1)`.
	pub fn new<V, F>(f: F) -> Self
	where
		V: Into<Value>,
		F: Fn(u64) -> V + Send + Sync + 'static,
	{
		Self {
			counter: Arc::new(AtomicU64::new(0)),
			format: Arc::new(move |n| f(n).into()),
		}
	}

	/// Advances the counter and formats the new number.
	pub fn next_value(&self) -> Value {
		let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
		(self.format)(n)
	}

	/// Last number handed out, 0 before the first value.
	pub fn current(&self) -> u64 {
		self.counter.load(Ordering::Relaxed)
	}
}

impl fmt::Debug for Sequence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Sequence")
			.field("current", &self.current())
			.finish_non_exhaustive()
	}
}

/// Shorthand for [`Generator::sequence`].
pub fn sequence<V, F>(f: F) -> Generator
where
	V: Into<Value>,
	F: Fn(u64) -> V + Send + Sync + 'static,
{
	Generator::sequence(f)
}
