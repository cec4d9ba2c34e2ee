//! Relational store facade
//!
//! Every public operation returns a sentinel: `None` or `false` on failure.
//! The matching `try_*` method returns the underlying [`StoreError`] instead.
//! Order of checks for each call: configured, then preconditions, then the
//! gate, then one driver round trip.

use crate::error::{PreconditionError, StoreError, settle};
use crate::gate::{ConnectionGate, GateConfig};
use crate::relational::driver::RelationalDriver;
use crate::relational::translator::{SqlStatement, SqlTranslator};
use crate::types::{Changes, Criteria, Record, Rows};
use mdbpg_conf::{PostgresConfig, SettingsError, SettingsSource};
use std::borrow::Cow;
use std::sync::Arc;

/// How generated statements reach the driver
///
/// `Parameterized` (the default) binds typed values as placeholders and
/// writes strings as escaped literals, so a quote inside a value cannot change
/// the statement while a string still lands in DATE, enum or UUID columns the
/// way the literal form does. `Literal` sends the historical inline text
/// (`WHERE c='x'`) byte for byte, without escaping. Raw `fetch`/`commit` text
/// is always sent unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SqlMode {
	#[default]
	Parameterized,
	Literal,
}

/// CRUD access to one relational database
pub struct RelationalStore {
	config: Option<PostgresConfig>,
	gate: ConnectionGate,
	driver: Arc<dyn RelationalDriver>,
	translator: SqlTranslator,
	mode: SqlMode,
}

impl RelationalStore {
	pub fn new(config: PostgresConfig, gate: GateConfig, driver: Arc<dyn RelationalDriver>) -> Self {
		Self {
			config: Some(config),
			gate: ConnectionGate::new(gate),
			driver,
			translator: SqlTranslator,
			mode: SqlMode::default(),
		}
	}

	/// A store whose every operation fails without contacting the backend
	pub fn unconfigured(gate: GateConfig, driver: Arc<dyn RelationalDriver>) -> Self {
		Self {
			config: None,
			gate: ConnectionGate::new(gate),
			driver,
			translator: SqlTranslator,
			mode: SqlMode::default(),
		}
	}

	/// Build from a settings resolution
	///
	/// A resolution error is logged once and yields an unconfigured store.
	pub fn from_resolution(
		resolution: Result<PostgresConfig, SettingsError>,
		gate: GateConfig,
		driver: Arc<dyn RelationalDriver>,
	) -> Self {
		match resolution {
			Ok(config) => Self::new(config, gate, driver),
			Err(e) => {
				tracing::error!(error = %e, "Failed to load the configuration for Postgres.");
				Self::unconfigured(gate, driver)
			}
		}
	}

	/// Resolve settings from `source` once and build the store
	pub fn from_source(
		source: &SettingsSource,
		gate: GateConfig,
		driver: Arc<dyn RelationalDriver>,
	) -> Self {
		Self::from_resolution(PostgresConfig::resolve(source), gate, driver)
	}

	/// PostgreSQL-backed store resolved from `source`
	///
	/// ```no_run
	/// use mdbpg_conf::SettingsSource;
	/// use mdbpg_db::gate::GateConfig;
	/// use mdbpg_db::relational::RelationalStore;
	///
	/// let store = RelationalStore::postgres(&SettingsSource::environment(), GateConfig::bounded(10));
	/// ```
	#[cfg(feature = "postgres")]
	pub fn postgres(source: &SettingsSource, gate: GateConfig) -> Self {
		Self::from_source(
			source,
			gate,
			Arc::new(crate::relational::postgres::PostgresDriver::new()),
		)
	}

	pub fn with_sql_mode(mut self, mode: SqlMode) -> Self {
		self.mode = mode;
		self
	}

	pub fn sql_mode(&self) -> SqlMode {
		self.mode
	}

	pub fn is_configured(&self) -> bool {
		self.config.is_some()
	}

	pub fn config(&self) -> Option<&PostgresConfig> {
		self.config.as_ref()
	}

	pub fn gate(&self) -> &ConnectionGate {
		&self.gate
	}

	fn require_config(&self) -> Result<&PostgresConfig, StoreError> {
		self.config.as_ref().ok_or(StoreError::NotConfigured)
	}

	fn prepare<'s>(&self, statement: &'s SqlStatement) -> Cow<'s, SqlStatement> {
		match self.mode {
			SqlMode::Parameterized => Cow::Borrowed(statement),
			SqlMode::Literal => Cow::Owned(statement.to_literal()),
		}
	}

	async fn run_fetch(
		&self,
		config: &PostgresConfig,
		statement: &SqlStatement,
	) -> Result<Vec<Record>, StoreError> {
		let statement = self.prepare(statement);
		tracing::trace!(sql = %statement.literal_sql(), "fetch");
		let _permit = self.gate.acquire().await?;
		Ok(self.driver.fetch(config, &statement).await?)
	}

	async fn run_commit(&self, config: &PostgresConfig, statement: &SqlStatement) -> Result<u64, StoreError> {
		let statement = self.prepare(statement);
		tracing::trace!(sql = %statement.literal_sql(), "commit");
		let _permit = self.gate.acquire().await?;
		Ok(self.driver.commit(config, &statement).await?)
	}

	/// Run caller-supplied query text and return every row
	pub async fn try_fetch(&self, query: &str) -> Result<Vec<Record>, StoreError> {
		let config = self.require_config()?;
		self.run_fetch(config, &SqlStatement::raw(query)).await
	}

	/// Run caller-supplied query text and return every row, `None` on failure
	pub async fn fetch(&self, query: &str) -> Option<Vec<Record>> {
		let result = self.try_fetch(query).await;
		settle("fetch", self.database_name(), result)
	}

	/// Run and commit caller-supplied statement text
	pub async fn try_commit(&self, query: &str) -> Result<u64, StoreError> {
		let config = self.require_config()?;
		self.run_commit(config, &SqlStatement::raw(query)).await
	}

	/// Run and commit caller-supplied statement text, `true` on success
	pub async fn commit(&self, query: &str) -> bool {
		let result = self.try_commit(query).await;
		settle("commit", self.database_name(), result).is_some()
	}

	pub async fn try_find(&self, table: &str, criteria: &Criteria) -> Result<Vec<Record>, StoreError> {
		let config = self.require_config()?;
		let statement = self.translator.select(table, criteria);
		self.run_fetch(config, &statement).await
	}

	/// Rows of `table` matching every criterion
	///
	/// Empty criteria selects every row. `Some(vec![])` means no match;
	/// `None` means the query could not be run.
	pub async fn find(&self, table: &str, criteria: &Criteria) -> Option<Vec<Record>> {
		settle("find", table, self.try_find(table, criteria).await)
	}

	async fn insert_row(&self, config: &PostgresConfig, table: &str, row: &Record) -> Result<(), StoreError> {
		let statement = self.translator.insert(table, row)?;
		self.run_commit(config, &statement).await.map(|_| ())
	}

	/// Insert one row or a sequence of rows
	///
	/// Each row of a sequence is committed on its own. A failing row does not
	/// stop the rows after it and nothing already committed is rolled back;
	/// the failures are collected into [`StoreError::PartialInsert`].
	pub async fn try_insert(&self, table: &str, rows: impl Into<Rows>) -> Result<(), StoreError> {
		let config = self.require_config()?;
		match rows.into() {
			Rows::Single(row) => self.insert_row(config, table, &row).await,
			Rows::Many(rows) => {
				if rows.is_empty() {
					return Err(PreconditionError::EmptyRows.into());
				}
				let mut failures = Vec::new();
				for (index, row) in rows.iter().enumerate() {
					if let Err(e) = self.insert_row(config, table, row).await {
						e.log("insert", table);
						failures.push((index, e));
					}
				}
				if failures.is_empty() {
					Ok(())
				} else {
					Err(StoreError::PartialInsert {
						total: rows.len(),
						failures,
					})
				}
			}
		}
	}

	/// Insert one row or a sequence of rows, `true` only if every row succeeded
	pub async fn insert(&self, table: &str, rows: impl Into<Rows>) -> bool {
		settle("insert", table, self.try_insert(table, rows).await).is_some()
	}

	/// Update matching rows, returning the affected row count
	pub async fn try_update(
		&self,
		table: &str,
		criteria: &Criteria,
		changes: &Changes,
	) -> Result<u64, StoreError> {
		let config = self.require_config()?;
		let statement = self.translator.update(table, criteria, changes)?;
		self.run_commit(config, &statement).await
	}

	/// Apply `changes` to rows matching `criteria`
	///
	/// Empty criteria updates every row of the table. Empty changes always
	/// fails without contacting the backend.
	pub async fn update(&self, table: &str, criteria: &Criteria, changes: &Changes) -> bool {
		settle("update", table, self.try_update(table, criteria, changes).await).is_some()
	}

	pub async fn try_delete(&self, table: &str, criteria: &Criteria) -> Result<u64, StoreError> {
		let config = self.require_config()?;
		let statement = self.translator.delete(table, criteria)?;
		self.run_commit(config, &statement).await
	}

	/// Delete rows matching `criteria`; empty criteria is refused
	pub async fn delete(&self, table: &str, criteria: &Criteria) -> bool {
		settle("delete", table, self.try_delete(table, criteria).await).is_some()
	}

	fn database_name(&self) -> &str {
		self.config.as_ref().map_or("", |c| c.dbname.as_str())
	}
}

impl std::fmt::Debug for RelationalStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RelationalStore")
			.field("config", &self.config)
			.field("gate", &self.gate)
			.field("mode", &self.mode)
			.finish_non_exhaustive()
	}
}
