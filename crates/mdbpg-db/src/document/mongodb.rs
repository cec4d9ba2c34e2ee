//! MongoDB driver with a client per call

use crate::document::driver::{DocumentDriver, DocumentTarget};
use crate::error::BackendError;
use async_trait::async_trait;
use bson::Document;
use futures::stream::TryStreamExt;
use mongodb::{Client, Collection};

/// Transient-client MongoDB driver
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoDriver;

impl MongoDriver {
	pub fn new() -> Self {
		Self
	}

	async fn connect(target: &DocumentTarget) -> Result<Client, BackendError> {
		Client::with_uri_str(target.uri())
			.await
			.map_err(BackendError::from)
	}

	fn collection(client: &Client, target: &DocumentTarget, name: &str) -> Collection<Document> {
		client.database(target.database()).collection::<Document>(name)
	}
}

#[async_trait]
impl DocumentDriver for MongoDriver {
	async fn find(
		&self,
		target: &DocumentTarget,
		collection: &str,
		filter: Document,
	) -> Result<Vec<Document>, BackendError> {
		let client = Self::connect(target).await?;
		let result: Result<Vec<Document>, mongodb::error::Error> = async {
			let cursor = Self::collection(&client, target, collection).find(filter).await?;
			cursor.try_collect().await
		}
		.await;
		client.shutdown().await;
		Ok(result?)
	}

	async fn insert_one(
		&self,
		target: &DocumentTarget,
		collection: &str,
		document: Document,
	) -> Result<(), BackendError> {
		let client = Self::connect(target).await?;
		let result = Self::collection(&client, target, collection)
			.insert_one(document)
			.await;
		client.shutdown().await;
		result?;
		Ok(())
	}

	async fn update_many(
		&self,
		target: &DocumentTarget,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<u64, BackendError> {
		let client = Self::connect(target).await?;
		let result = Self::collection(&client, target, collection)
			.update_many(filter, update)
			.await;
		client.shutdown().await;
		Ok(result?.modified_count)
	}

	async fn delete_many(
		&self,
		target: &DocumentTarget,
		collection: &str,
		filter: Document,
	) -> Result<u64, BackendError> {
		let client = Self::connect(target).await?;
		let result = Self::collection(&client, target, collection)
			.delete_many(filter)
			.await;
		client.shutdown().await;
		Ok(result?.deleted_count)
	}
}
