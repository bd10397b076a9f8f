//! Factory settings.
//!
//! Settings load from TOML or from `FABRIK_*` environment variables and can
//! be adjusted with the `with_*` builder methods.
//!
//! ```toml
//! reload_after_save = true
//! max_depth = 32
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{BuildError, BuildResult};

const ENV_RELOAD_AFTER_SAVE: &str = "FABRIK_RELOAD_AFTER_SAVE";
const ENV_MAX_DEPTH: &str = "FABRIK_MAX_DEPTH";

/// Behaviour switches for a [`Factory`](crate::factory::Factory).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactorySettings {
	/// Reload every record from storage after `make` saves it.
	pub reload_after_save: bool,

	/// Maximum nesting of association constructions.
	pub max_depth: usize,
}

impl Default for FactorySettings {
	fn default() -> Self {
		Self {
			reload_after_save: true,
			max_depth: 32,
		}
	}
}

impl FactorySettings {
	/// Creates default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses settings from a TOML document. Missing keys keep their defaults.
	pub fn from_toml_str(source: &str) -> BuildResult<Self> {
		let settings: Self = toml::from_str(source)?;
		settings.validate()
	}

	/// Reads settings from a TOML file.
	pub fn from_path(path: impl AsRef<Path>) -> BuildResult<Self> {
		let source = std::fs::read_to_string(path)?;
		Self::from_toml_str(&source)
	}

	/// Reads settings from `FABRIK_RELOAD_AFTER_SAVE` and `FABRIK_MAX_DEPTH`.
	pub fn from_env() -> BuildResult<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BuildResult<Self> {
		let mut settings = Self::default();

		if let Some(raw) = lookup(ENV_RELOAD_AFTER_SAVE) {
			settings.reload_after_save = parse_bool(ENV_RELOAD_AFTER_SAVE, &raw)?;
		}
		if let Some(raw) = lookup(ENV_MAX_DEPTH) {
			settings.max_depth = raw.trim().parse().map_err(|_| {
				BuildError::Settings(format!("{ENV_MAX_DEPTH} must be an integer, got '{raw}'"))
			})?;
		}

		settings.validate()
	}

	/// Sets whether records are reloaded after saving.
	pub fn with_reload_after_save(mut self, reload: bool) -> Self {
		self.reload_after_save = reload;
		self
	}

	/// Sets the association nesting limit.
	pub fn with_max_depth(mut self, depth: usize) -> Self {
		self.max_depth = depth;
		self
	}

	fn validate(self) -> BuildResult<Self> {
		if self.max_depth == 0 {
			return Err(BuildError::Settings(
				"max_depth must be at least 1".to_string(),
			));
		}
		Ok(self)
	}
}

fn parse_bool(key: &str, raw: &str) -> BuildResult<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(BuildError::Settings(format!(
			"{key} must be a boolean, got '{raw}'"
		))),
	}
}
