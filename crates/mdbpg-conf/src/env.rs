//! Environment variable lookup

use crate::error::SettingsError;
use std::env;

/// Environment variable reader with optional prefix support
#[derive(Debug, Clone, Default)]
pub struct Env {
	/// Optional prefix prepended to every lookup (e.g. `"STAGING_"`)
	pub prefix: Option<String>,
}

impl Env {
	/// Create a reader over the unprefixed process environment
	pub fn new() -> Self {
		Self { prefix: None }
	}

	/// Set a prefix for all environment variable lookups
	///
	/// # Examples
	///
	/// ```
	/// use mdbpg_conf::Env;
	///
	/// let env = Env::new().with_prefix("STAGING_");
	/// assert_eq!(env.key_name("postgres_username"), "STAGING_POSTGRES_USERNAME");
	/// ```
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	/// Full variable name for a settings key
	pub fn key_name(&self, key: &str) -> String {
		let upper = key.to_uppercase();
		match &self.prefix {
			Some(prefix) => format!("{}{}", prefix, upper),
			None => upper,
		}
	}

	/// Read a variable, `Ok(None)` when it is not set
	pub fn optional(&self, key: &str) -> Result<Option<String>, SettingsError> {
		let full_key = self.key_name(key);
		match env::var(&full_key) {
			Ok(value) => Ok(Some(value)),
			Err(env::VarError::NotPresent) => Ok(None),
			Err(env::VarError::NotUnicode(_)) => Err(SettingsError::InvalidValue {
				key: full_key,
				reason: "value is not valid unicode".to_string(),
			}),
		}
	}
}
