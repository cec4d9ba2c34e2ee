//! Criteria to SQL translation
//!
//! Every statement is produced in two forms at once. The parameterized form
//! binds typed values (numbers, booleans, dates, UUIDs, ...) as `$1, $2, ...`
//! and writes strings inline as escaped literals, so the server still infers
//! the column type of a quoted string (DATE, TIMESTAMP, enum, UUID) exactly as
//! it does for the legacy literal form. The literal form renders every value
//! inline with nothing escaped. Table and column names are written verbatim
//! in both forms. A NULL value is written as the `NULL` keyword and never
//! bound.

use crate::error::PreconditionError;
use crate::types::{Changes, Criteria, Record, Value};

/// A SQL statement ready for a driver
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
	sql: String,
	params: Vec<Value>,
	literal: String,
}

impl SqlStatement {
	/// Caller-supplied text executed as-is, without parameters
	pub fn raw(sql: impl Into<String>) -> Self {
		let sql = sql.into();
		Self {
			literal: sql.clone(),
			sql,
			params: Vec::new(),
		}
	}

	/// Text sent in parameterized mode
	pub fn sql(&self) -> &str {
		&self.sql
	}

	pub fn params(&self) -> &[Value] {
		&self.params
	}

	pub fn has_params(&self) -> bool {
		!self.params.is_empty()
	}

	/// Text with every value inlined (strings quoted, nothing escaped)
	pub fn literal_sql(&self) -> &str {
		&self.literal
	}

	/// Statement that executes the literal text without parameters
	pub fn to_literal(&self) -> Self {
		Self::raw(self.literal.clone())
	}
}

/// `'text'` with every single quote doubled
fn quote_escaped(text: &str) -> String {
	format!("'{}'", text.replace('\'', "''"))
}

#[derive(Default)]
struct StatementWriter {
	sql: String,
	params: Vec<Value>,
	literal: String,
}

impl StatementWriter {
	fn push(&mut self, text: &str) -> &mut Self {
		self.sql.push_str(text);
		self.literal.push_str(text);
		self
	}

	fn push_value(&mut self, value: &Value) -> &mut Self {
		match value {
			Value::Null => return self.push("NULL"),
			Value::String(s) => {
				self.sql.push_str(&quote_escaped(s));
				self.literal.push_str(&value.to_sql_literal());
				return self;
			}
			_ => {}
		}
		self.params.push(value.clone());
		self.sql.push('$');
		self.sql.push_str(&self.params.len().to_string());
		self.literal.push_str(&value.to_sql_literal());
		self
	}

	/// `k1=v1<sep>k2=v2...`
	fn push_pairs(&mut self, pairs: &Record, separator: &str) -> &mut Self {
		for (i, (key, value)) in pairs.iter().enumerate() {
			if i > 0 {
				self.push(separator);
			}
			self.push(key).push("=").push_value(value);
		}
		self
	}

	fn push_where(&mut self, criteria: &Criteria) -> &mut Self {
		if !criteria.is_empty() {
			self.push(" WHERE ").push_pairs(criteria, " AND ");
		}
		self
	}

	fn finish(self) -> SqlStatement {
		SqlStatement {
			sql: self.sql,
			params: self.params,
			literal: self.literal,
		}
	}
}

/// Translates criteria/changes mappings into SQL
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlTranslator;

impl SqlTranslator {
	/// `SELECT * FROM table [WHERE c1=v1 AND ...]`
	///
	/// # Examples
	///
	/// ```
	/// use mdbpg_db::record;
	/// use mdbpg_db::relational::SqlTranslator;
	///
	/// let statement = SqlTranslator.select("TESTTBL", &record! { "a" => true, "c" => "x" });
	/// assert_eq!(statement.sql(), "SELECT * FROM TESTTBL WHERE a=$1 AND c='x'");
	/// assert_eq!(statement.literal_sql(), "SELECT * FROM TESTTBL WHERE a=true AND c='x'");
	/// ```
	pub fn select(&self, table: &str, criteria: &Criteria) -> SqlStatement {
		let mut writer = StatementWriter::default();
		writer.push("SELECT * FROM ").push(table).push_where(criteria);
		writer.finish()
	}

	/// `INSERT INTO table(c1,c2,...) VALUES(v1,v2,...)`
	pub fn insert(&self, table: &str, row: &Record) -> Result<SqlStatement, PreconditionError> {
		if row.is_empty() {
			return Err(PreconditionError::EmptyRow);
		}
		let mut writer = StatementWriter::default();
		writer.push("INSERT INTO ").push(table).push("(");
		for (i, column) in row.keys().enumerate() {
			if i > 0 {
				writer.push(",");
			}
			writer.push(column);
		}
		writer.push(") VALUES(");
		for (i, (_, value)) in row.iter().enumerate() {
			if i > 0 {
				writer.push(",");
			}
			writer.push_value(value);
		}
		writer.push(")");
		Ok(writer.finish())
	}

	/// `UPDATE table SET c=v,... [WHERE ...]`
	///
	/// Empty criteria produces an update of every row.
	pub fn update(
		&self,
		table: &str,
		criteria: &Criteria,
		changes: &Changes,
	) -> Result<SqlStatement, PreconditionError> {
		if changes.is_empty() {
			return Err(PreconditionError::EmptyChanges);
		}
		let mut writer = StatementWriter::default();
		writer
			.push("UPDATE ")
			.push(table)
			.push(" SET ")
			.push_pairs(changes, ",")
			.push_where(criteria);
		Ok(writer.finish())
	}

	/// `DELETE FROM table WHERE ...`; refuses empty criteria
	pub fn delete(&self, table: &str, criteria: &Criteria) -> Result<SqlStatement, PreconditionError> {
		if criteria.is_empty() {
			return Err(PreconditionError::EmptyCriteria);
		}
		let mut writer = StatementWriter::default();
		writer.push("DELETE FROM ").push(table).push_where(criteria);
		Ok(writer.finish())
	}
}
