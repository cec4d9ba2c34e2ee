//! Relational driver seam

use crate::error::BackendError;
use crate::relational::translator::SqlStatement;
use crate::types::Record;
use async_trait::async_trait;
use mdbpg_conf::PostgresConfig;

/// Executes statements against a relational server
///
/// Implementations open a fresh connection per call and close it before
/// returning, whatever the outcome. Connections are never shared between
/// calls.
#[async_trait]
pub trait RelationalDriver: Send + Sync {
	/// Run a row-returning statement and materialize every row
	async fn fetch(
		&self,
		config: &PostgresConfig,
		statement: &SqlStatement,
	) -> Result<Vec<Record>, BackendError>;

	/// Run a statement and commit it, returning the affected row count
	async fn commit(&self, config: &PostgresConfig, statement: &SqlStatement)
	-> Result<u64, BackendError>;
}
