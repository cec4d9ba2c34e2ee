//! Document driver seam

use crate::error::BackendError;
use async_trait::async_trait;
use bson::Document;
use mdbpg_conf::MongoConfig;
use mdbpg_conf::database::mask_url_password;
use std::fmt;

/// Where a document store connects
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentTarget {
	uri: String,
	database: String,
}

impl DocumentTarget {
	/// `None` when the connection string is empty
	pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Option<Self> {
		let uri = uri.into();
		if uri.is_empty() {
			return None;
		}
		Some(Self {
			uri,
			database: database.into(),
		})
	}

	pub fn uri(&self) -> &str {
		&self.uri
	}

	pub fn database(&self) -> &str {
		&self.database
	}
}

impl From<&MongoConfig> for DocumentTarget {
	fn from(config: &MongoConfig) -> Self {
		Self {
			uri: config.connection_string(),
			database: config.dbname.clone(),
		}
	}
}

impl fmt::Debug for DocumentTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DocumentTarget")
			.field("uri", &mask_url_password(&self.uri))
			.field("database", &self.database)
			.finish()
	}
}

/// Executes operations against a document server
///
/// Implementations build a client per call and shut it down before
/// returning.
#[async_trait]
pub trait DocumentDriver: Send + Sync {
	async fn find(
		&self,
		target: &DocumentTarget,
		collection: &str,
		filter: Document,
	) -> Result<Vec<Document>, BackendError>;

	async fn insert_one(
		&self,
		target: &DocumentTarget,
		collection: &str,
		document: Document,
	) -> Result<(), BackendError>;

	/// Returns the modified document count
	async fn update_many(
		&self,
		target: &DocumentTarget,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<u64, BackendError>;

	/// Returns the deleted document count
	async fn delete_many(
		&self,
		target: &DocumentTarget,
		collection: &str,
		filter: Document,
	) -> Result<u64, BackendError>;
}
