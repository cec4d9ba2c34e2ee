//! Settings error types

use std::path::PathBuf;

/// Error raised while loading or resolving connection settings
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("failed to read settings file {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Parse error: {0}")]
	Parse(String),

	/// One or more required fields were absent from the source
	#[error("missing required settings: {}", .0.join(", "))]
	MissingFields(Vec<String>),

	#[error("invalid value for {key}: {reason}")]
	InvalidValue { key: String, reason: String },
}

impl SettingsError {
	/// Names of the missing fields, empty for every other error kind
	pub fn missing_fields(&self) -> &[String] {
		match self {
			Self::MissingFields(fields) => fields,
			_ => &[],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_missing_fields_display_lists_every_field() {
		let err = SettingsError::MissingFields(vec![
			"POSTGRES_USERNAME".to_string(),
			"POSTGRES_DBNAME".to_string(),
		]);

		assert_eq!(
			err.to_string(),
			"missing required settings: POSTGRES_USERNAME, POSTGRES_DBNAME"
		);
		assert_eq!(err.missing_fields().len(), 2);
	}

	#[test]
	fn test_missing_fields_empty_for_other_kinds() {
		let err = SettingsError::Parse("bad".to_string());

		assert!(err.missing_fields().is_empty());
	}
}
