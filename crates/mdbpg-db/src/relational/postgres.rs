//! PostgreSQL driver over a single `sqlx::PgConnection` per call

use crate::error::BackendError;
use crate::relational::driver::RelationalDriver;
use crate::relational::translator::SqlStatement;
use crate::types::{Record, Value};
use async_trait::async_trait;
use mdbpg_conf::PostgresConfig;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgRow, PgTypeKind, PgValueFormat};
use sqlx::query::Query;
use sqlx::{Column, Connection, Executor, PgConnection, Postgres, Row, TypeInfo, ValueRef};

/// Transient-connection PostgreSQL driver
///
/// Statements with bound values go through the extended protocol. Statements
/// without any (raw text and literal-mode statements) go through the simple
/// protocol, so raw text may hold several `;`-separated statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDriver;

impl PostgresDriver {
	pub fn new() -> Self {
		Self
	}

	pub(crate) fn connect_options(config: &PostgresConfig) -> PgConnectOptions {
		PgConnectOptions::new()
			.host(&config.hostname)
			.port(config.port())
			.username(&config.username)
			.password(&config.password)
			.database(&config.dbname)
	}

	async fn connect(config: &PostgresConfig) -> Result<PgConnection, BackendError> {
		PgConnection::connect_with(&Self::connect_options(config))
			.await
			.map_err(BackendError::from)
	}

	async fn close(conn: PgConnection) {
		if let Err(e) = conn.close().await {
			tracing::debug!(error = %e, "error while closing postgres connection");
		}
	}

	fn bind_value<'q>(
		query: Query<'q, Postgres, PgArguments>,
		value: &'q Value,
	) -> Query<'q, Postgres, PgArguments> {
		match value {
			Value::Null => query.bind(None::<String>),
			Value::Bool(b) => query.bind(b),
			Value::Int(i) => query.bind(i),
			Value::Float(f) => query.bind(f),
			Value::String(s) => query.bind(s.as_str()),
			Value::Decimal(d) => query.bind(d),
			Value::Date(d) => query.bind(d),
			Value::Time(t) => query.bind(t),
			Value::Timestamp(ts) => query.bind(ts),
			Value::TimestampTz(ts) => query.bind(ts),
			Value::Uuid(u) => query.bind(u),
			Value::Bytes(bytes) => query.bind(bytes.as_slice()),
		}
	}

	fn build_query(statement: &SqlStatement) -> Query<'_, Postgres, PgArguments> {
		statement
			.params()
			.iter()
			.fold(sqlx::query(statement.sql()), Self::bind_value)
	}

	/// Decode one column, trying each supported type in turn
	///
	/// A NULL of any type decodes through the first attempt. Enum columns and
	/// values sent in text format fall back to their text. Anything else is a
	/// serialization error rather than a silent NULL.
	fn convert_value(pg_row: &PgRow, index: usize) -> Result<Value, BackendError> {
		if let Ok(v) = pg_row.try_get::<Option<bool>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<i64>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<i32>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<i16>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<f64>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<f32>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<rust_decimal::Decimal>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<String>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<chrono::NaiveDate>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<chrono::NaiveTime>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<chrono::NaiveDateTime>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<uuid::Uuid>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<Vec<u8>>, _>(index) {
			return Ok(Value::from(v));
		}
		if let Ok(v) = pg_row.try_get::<Option<serde_json::Value>, _>(index) {
			return Ok(Value::from(v.map(|json| json.to_string())));
		}

		let column = &pg_row.columns()[index];
		let raw = pg_row.try_get_raw(index).map_err(BackendError::from)?;
		if raw.is_null() {
			return Ok(Value::Null);
		}
		if matches!(column.type_info().kind(), PgTypeKind::Enum(_)) || raw.format() == PgValueFormat::Text {
			return raw
				.as_str()
				.map(|text| Value::String(text.to_string()))
				.map_err(|e| BackendError::Serialization(e.to_string()));
		}
		Err(BackendError::Serialization(format!(
			"column \"{}\" has unsupported type {}",
			column.name(),
			column.type_info().name()
		)))
	}

	fn convert_row(pg_row: &PgRow) -> Result<Record, BackendError> {
		let mut record = Record::new();
		for (index, column) in pg_row.columns().iter().enumerate() {
			record.insert(column.name(), Self::convert_value(pg_row, index)?);
		}
		Ok(record)
	}

	async fn fetch_rows(
		conn: &mut PgConnection,
		statement: &SqlStatement,
	) -> Result<Vec<PgRow>, sqlx::Error> {
		if statement.has_params() {
			conn.fetch_all(Self::build_query(statement)).await
		} else {
			conn.fetch_all(sqlx::raw_sql(statement.sql())).await
		}
	}

	async fn execute_committed(
		conn: &mut PgConnection,
		statement: &SqlStatement,
	) -> Result<u64, sqlx::Error> {
		let mut tx = conn.begin().await?;
		let result = if statement.has_params() {
			(&mut *tx).execute(Self::build_query(statement)).await?
		} else {
			(&mut *tx).execute(sqlx::raw_sql(statement.sql())).await?
		};
		tx.commit().await?;
		Ok(result.rows_affected())
	}
}

#[async_trait]
impl RelationalDriver for PostgresDriver {
	async fn fetch(
		&self,
		config: &PostgresConfig,
		statement: &SqlStatement,
	) -> Result<Vec<Record>, BackendError> {
		let mut conn = Self::connect(config).await?;
		let result = Self::fetch_rows(&mut conn, statement).await;
		Self::close(conn).await;
		result?.iter().map(Self::convert_row).collect()
	}

	async fn commit(
		&self,
		config: &PostgresConfig,
		statement: &SqlStatement,
	) -> Result<u64, BackendError> {
		let mut conn = Self::connect(config).await?;
		let result = Self::execute_committed(&mut conn, statement).await;
		Self::close(conn).await;
		Ok(result?)
	}
}
