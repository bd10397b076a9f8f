//! Error types for object construction.
//!
//! Host failures (a rejected save, an unknown column) pass through these
//! variants unchanged so the caller sees the original cause.

use thiserror::Error;

/// Errors that can occur while building, persisting or planning objects.
#[derive(Debug, Error)]
pub enum BuildError {
	/// No master blueprint is registered for the model.
	#[error("No blueprint for model: {0}")]
	NoBlueprint(String),

	/// The requested named blueprint is not registered for the model.
	#[error("No blueprint named '{name}' for model: {model}")]
	NoNamedBlueprint {
		/// Model identifier.
		model: String,
		/// Blueprint name.
		name: String,
	},

	/// The object model does not know the model identifier.
	#[error("Unknown model: {0}")]
	UnknownModel(String),

	/// The object model rejected an attribute name.
	#[error("Unknown attribute: {model}.{attribute}")]
	UnknownAttribute {
		/// Model identifier.
		model: String,
		/// Attribute name.
		attribute: String,
	},

	/// An association generator names an attribute that is not a relationship.
	#[error("No association named '{attribute}' on model: {model}")]
	UnknownAssociation {
		/// Model identifier.
		model: String,
		/// Attribute name.
		attribute: String,
	},

	/// A collection construction targets something other than a collection relationship.
	#[error("'{collection}' is not a collection of model: {model}")]
	NotACollection {
		/// Parent model identifier.
		model: String,
		/// Relationship name.
		collection: String,
	},

	/// The backing store rejected a record.
	#[error("Validation failed for {model}: {message}")]
	Validation {
		/// Model identifier.
		model: String,
		/// Validation message.
		message: String,
	},

	/// The backing store failed to persist or reload a record.
	#[error("Persistence error: {0}")]
	Persistence(String),

	/// Association constructions nested deeper than the configured limit.
	#[error("Association nesting exceeded {limit} levels while building {model}")]
	RecursionLimit {
		/// Model that would have exceeded the limit.
		model: String,
		/// Configured limit.
		limit: usize,
	},

	/// A planned attribute still holds a live record and cannot become JSON.
	#[error("Attribute '{0}' holds a record and cannot be flattened")]
	UnflattenedRecord(String),

	/// A lazy generator failed.
	#[error("Generator error: {0}")]
	Generator(String),

	/// Invalid factory settings.
	#[error("Settings error: {0}")]
	Settings(String),

	/// I/O operation failed.
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	JsonError(#[from] serde_json::Error),

	/// TOML settings could not be parsed.
	#[error("TOML error: {0}")]
	TomlError(#[from] toml::de::Error),
}

/// Result type alias for construction operations.
pub type BuildResult<T> = Result<T, BuildError>;
