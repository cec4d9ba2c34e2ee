//! Document store facade
//!
//! Mirrors [`RelationalStore`](crate::relational::RelationalStore) except
//! that `delete` with empty criteria is accepted and removes every document
//! of the collection.

use crate::document::driver::{DocumentDriver, DocumentTarget};
use crate::document::translator::DocumentTranslator;
use crate::error::{StoreError, settle};
use crate::gate::{ConnectionGate, GateConfig};
use crate::types::{Changes, Criteria, Record};
use bson::Document;
use mdbpg_conf::{MongoConfig, SettingsError, SettingsSource};
use std::sync::Arc;

/// Payload accepted by [`DocumentStore::insert`]
pub trait IntoDocument {
	fn into_document(self) -> Document;
}

impl IntoDocument for Document {
	fn into_document(self) -> Document {
		self
	}
}

impl IntoDocument for Record {
	fn into_document(self) -> Document {
		Document::from(self)
	}
}

impl IntoDocument for &Record {
	fn into_document(self) -> Document {
		Document::from(self)
	}
}

/// CRUD access to one document database
pub struct DocumentStore {
	target: Option<DocumentTarget>,
	gate: ConnectionGate,
	driver: Arc<dyn DocumentDriver>,
	translator: DocumentTranslator,
}

impl DocumentStore {
	pub fn new(target: DocumentTarget, gate: GateConfig, driver: Arc<dyn DocumentDriver>) -> Self {
		Self {
			target: Some(target),
			gate: ConnectionGate::new(gate),
			driver,
			translator: DocumentTranslator,
		}
	}

	/// A store whose every operation fails without contacting the backend
	pub fn unconfigured(gate: GateConfig, driver: Arc<dyn DocumentDriver>) -> Self {
		Self {
			target: None,
			gate: ConnectionGate::new(gate),
			driver,
			translator: DocumentTranslator,
		}
	}

	/// Build from an explicit connection string; an empty one leaves the
	/// store unconfigured
	pub fn from_uri(
		uri: impl Into<String>,
		database: impl Into<String>,
		gate: GateConfig,
		driver: Arc<dyn DocumentDriver>,
	) -> Self {
		match DocumentTarget::new(uri, database) {
			Some(target) => Self::new(target, gate, driver),
			None => {
				tracing::error!("Failed to load the configuration for MongoDB: empty connection string");
				Self::unconfigured(gate, driver)
			}
		}
	}

	/// Build from a settings resolution; an error yields an unconfigured store
	pub fn from_resolution(
		resolution: Result<MongoConfig, SettingsError>,
		gate: GateConfig,
		driver: Arc<dyn DocumentDriver>,
	) -> Self {
		match resolution {
			Ok(config) => Self::new(DocumentTarget::from(&config), gate, driver),
			Err(e) => {
				tracing::error!(error = %e, "Failed to load the configuration for MongoDB.");
				Self::unconfigured(gate, driver)
			}
		}
	}

	/// Resolve settings from `source` once and build the store
	pub fn from_source(source: &SettingsSource, gate: GateConfig, driver: Arc<dyn DocumentDriver>) -> Self {
		Self::from_resolution(MongoConfig::resolve(source), gate, driver)
	}

	/// MongoDB-backed store resolved from `source`
	#[cfg(feature = "mongodb")]
	pub fn mongodb(source: &SettingsSource, gate: GateConfig) -> Self {
		Self::from_source(source, gate, Arc::new(crate::document::MongoDriver::new()))
	}

	pub fn is_configured(&self) -> bool {
		self.target.is_some()
	}

	pub fn target(&self) -> Option<&DocumentTarget> {
		self.target.as_ref()
	}

	pub fn gate(&self) -> &ConnectionGate {
		&self.gate
	}

	fn require_target(&self) -> Result<&DocumentTarget, StoreError> {
		self.target.as_ref().ok_or(StoreError::NotConfigured)
	}

	pub async fn try_find(&self, collection: &str, criteria: &Criteria) -> Result<Vec<Document>, StoreError> {
		let target = self.require_target()?;
		let filter = self.translator.filter(criteria);
		let _permit = self.gate.acquire().await?;
		Ok(self.driver.find(target, collection, filter).await?)
	}

	/// Documents matching every criterion, `None` on failure
	pub async fn find(&self, collection: &str, criteria: &Criteria) -> Option<Vec<Document>> {
		settle("find", collection, self.try_find(collection, criteria).await)
	}

	pub async fn try_insert(&self, collection: &str, document: impl IntoDocument) -> Result<(), StoreError> {
		let target = self.require_target()?;
		let document = document.into_document();
		let _permit = self.gate.acquire().await?;
		Ok(self.driver.insert_one(target, collection, document).await?)
	}

	/// Insert exactly one document
	pub async fn insert(&self, collection: &str, document: impl IntoDocument) -> bool {
		settle("insert", collection, self.try_insert(collection, document).await).is_some()
	}

	/// Set `changes` on every matching document, returning the modified count
	pub async fn try_update(
		&self,
		collection: &str,
		criteria: &Criteria,
		changes: &Changes,
	) -> Result<u64, StoreError> {
		let target = self.require_target()?;
		let update = self.translator.update(changes)?;
		let filter = self.translator.filter(criteria);
		let _permit = self.gate.acquire().await?;
		Ok(self.driver.update_many(target, collection, filter, update).await?)
	}

	/// Set `changes` on every matching document
	///
	/// Empty criteria targets the whole collection. Empty changes fails
	/// without contacting the backend.
	pub async fn update(&self, collection: &str, criteria: &Criteria, changes: &Changes) -> bool {
		settle("update", collection, self.try_update(collection, criteria, changes).await).is_some()
	}

	pub async fn try_delete(&self, collection: &str, criteria: &Criteria) -> Result<u64, StoreError> {
		let target = self.require_target()?;
		let filter = self.translator.filter(criteria);
		let _permit = self.gate.acquire().await?;
		Ok(self.driver.delete_many(target, collection, filter).await?)
	}

	/// Delete every matching document; empty criteria empties the collection
	pub async fn delete(&self, collection: &str, criteria: &Criteria) -> bool {
		settle("delete", collection, self.try_delete(collection, criteria).await).is_some()
	}
}

impl std::fmt::Debug for DocumentStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DocumentStore")
			.field("target", &self.target)
			.field("gate", &self.gate)
			.finish_non_exhaustive()
	}
}
