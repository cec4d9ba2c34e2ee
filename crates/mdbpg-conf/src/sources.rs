//! Settings sources
//!
//! A store resolves its fields from exactly one [`SettingsSource`]: the
//! process environment or a loaded TOML [`SettingsSection`].

use crate::env::Env;
use crate::error::SettingsError;
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// TOML file reader producing a flat key/value map
///
/// Top-level scalars keep their key. Scalars inside a top-level table are
/// flattened to `<table>_<key>`, so `[postgres] username = ".."` and
/// `postgres_username = ".."` resolve identically.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	/// Create a new TOML file source
	///
	/// # Examples
	///
	/// ```
	/// use mdbpg_conf::TomlFileSource;
	///
	/// let source = TomlFileSource::new("settings/database.toml");
	/// assert!(source.path().ends_with("database.toml"));
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Read and parse the file
	///
	/// Unlike a layered settings stack, a missing file is an error here: the
	/// caller asked for this section explicitly.
	pub fn load(&self) -> Result<IndexMap<String, Value>, SettingsError> {
		let content = fs::read_to_string(&self.path).map_err(|source| SettingsError::Io {
			path: self.path.clone(),
			source,
		})?;
		let table: toml::Table = toml::from_str(&content)?;

		// Convert TOML value to JSON value
		let json_value = serde_json::to_value(&table)?;
		let map = json_value
			.as_object()
			.ok_or_else(|| SettingsError::Parse("Expected table at root".to_string()))?;

		let mut flat = IndexMap::new();
		for (key, value) in map {
			match value {
				Value::Object(inner) => {
					for (inner_key, inner_value) in inner {
						if !inner_value.is_object() {
							flat.insert(format!("{}_{}", key, inner_key), inner_value.clone());
						}
					}
				}
				other => {
					flat.insert(key.clone(), other.clone());
				}
			}
		}
		Ok(flat)
	}
}

/// A loaded, named TOML section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsSection {
	name: String,
	values: IndexMap<String, Value>,
}

impl SettingsSection {
	/// Build a section from already-parsed values
	pub fn new(name: impl Into<String>, values: IndexMap<String, Value>) -> Self {
		Self {
			name: name.into(),
			values,
		}
	}

	/// Build a section from string pairs
	///
	/// # Examples
	///
	/// ```
	/// use mdbpg_conf::SettingsSection;
	///
	/// let section = SettingsSection::from_pairs("database", [("postgres_port", "6543")]);
	/// assert_eq!(section.get("postgres_port"), Some("6543".to_string()));
	/// ```
	pub fn from_pairs<K, V>(name: impl Into<String>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		let values = pairs
			.into_iter()
			.map(|(k, v)| (k.into(), Value::String(v.into())))
			.collect();
		Self::new(name, values)
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Textual value of a key
	///
	/// Strings are returned verbatim, numbers and booleans in their textual
	/// form. Null, arrays and tables count as absent.
	pub fn get(&self, key: &str) -> Option<String> {
		match self.values.get(key)? {
			Value::String(s) => Some(s.clone()),
			Value::Number(n) => Some(n.to_string()),
			Value::Bool(b) => Some(b.to_string()),
			_ => None,
		}
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

/// Directory holding `<section>.toml` files
#[derive(Debug, Clone)]
pub struct SettingsDirectory {
	root: PathBuf,
}

impl SettingsDirectory {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// Path of the file backing `section`
	pub fn section_path(&self, section: &str) -> PathBuf {
		self.root.join(format!("{}.toml", section))
	}

	/// Load `<root>/<section>.toml`
	pub fn load_section(&self, section: &str) -> Result<SettingsSection, SettingsError> {
		let path = self.section_path(section);
		let values = TomlFileSource::new(&path).load()?;
		tracing::debug!(section, path = %path.display(), keys = values.len(), "loaded settings section");
		Ok(SettingsSection::new(section, values))
	}
}

/// Where a store's connection fields come from
#[derive(Debug, Clone)]
pub enum SettingsSource {
	/// Process environment; keys are looked up upper-cased
	Environment(Env),
	/// A loaded TOML section; keys are looked up verbatim
	Section(SettingsSection),
}

impl SettingsSource {
	/// The unprefixed process environment
	pub fn environment() -> Self {
		Self::Environment(Env::new())
	}

	pub fn is_environment(&self) -> bool {
		matches!(self, Self::Environment(_))
	}

	/// Look up a settings key
	pub fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
		match self {
			Self::Environment(env) => env.optional(key),
			Self::Section(section) => Ok(section.get(key)),
		}
	}

	/// Name under which `key` is reported when it is missing
	pub fn display_key(&self, key: &str) -> String {
		match self {
			Self::Environment(env) => env.key_name(key),
			Self::Section(section) => format!("{}.{}", section.name(), key),
		}
	}
}

impl From<SettingsSection> for SettingsSource {
	fn from(section: SettingsSection) -> Self {
		Self::Section(section)
	}
}
