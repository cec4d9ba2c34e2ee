//! In-process drivers for store tests
//!
//! `MemoryRelationalDriver` understands exactly the statement shapes the SQL
//! translator emits (parameterized or literal), keeps tables in memory and
//! records every call. `MemoryDocumentDriver` implements equality filters and
//! `$set` over in-memory collections.

#![allow(dead_code)]

use async_trait::async_trait;
use bson::{Bson, Document};
use mdbpg_conf::PostgresConfig;
use mdbpg_db::document::{DocumentDriver, DocumentTarget};
use mdbpg_db::relational::{RelationalDriver, SqlStatement};
use mdbpg_db::{BackendError, Record, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn postgres_config() -> PostgresConfig {
	PostgresConfig::new("app", "pw", "localhost", "main")
}

pub fn document_target() -> DocumentTarget {
	DocumentTarget::new("mongodb://app:pw@localhost:27017/", "main").unwrap()
}

/// Tracks in-flight calls and the highest concurrency observed
#[derive(Debug, Default)]
pub struct CallTracker {
	calls: AtomicUsize,
	active: AtomicUsize,
	peak: AtomicUsize,
}

impl CallTracker {
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn peak(&self) -> usize {
		self.peak.load(Ordering::SeqCst)
	}

	fn enter(&self) {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let current = self.active.fetch_add(1, Ordering::SeqCst) + 1;
		self.peak.fetch_max(current, Ordering::SeqCst);
	}

	fn leave(&self) {
		self.active.fetch_sub(1, Ordering::SeqCst);
	}
}

#[derive(Debug, Clone, PartialEq)]
enum Parsed {
	Select {
		table: String,
		criteria: Record,
	},
	Insert {
		table: String,
		row: Record,
	},
	Update {
		table: String,
		changes: Record,
		criteria: Record,
	},
	Delete {
		table: String,
		criteria: Record,
	},
}

fn syntax(sql: &str) -> BackendError {
	BackendError::QuerySyntax(format!("syntax error in \"{}\"", sql))
}

/// Resolve `$n`, a quoted (possibly escaped) string, `NULL`, a boolean or a number
fn parse_value(token: &str, params: &[Value]) -> Option<Value> {
	let token = token.trim();
	if let Some(index) = token.strip_prefix('$') {
		let index: usize = index.parse().ok()?;
		return params.get(index.checked_sub(1)?).cloned();
	}
	if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
		return Some(Value::String(token[1..token.len() - 1].replace("''", "'")));
	}
	match token {
		"NULL" => Some(Value::Null),
		"true" => Some(Value::Bool(true)),
		"false" => Some(Value::Bool(false)),
		_ => token
			.parse::<i64>()
			.map(Value::Int)
			.ok()
			.or_else(|| token.parse::<f64>().map(Value::Float).ok()),
	}
}

fn parse_pairs(text: &str, separator: &str, params: &[Value]) -> Option<Record> {
	let mut record = Record::new();
	for pair in text.split(separator) {
		let (column, value) = pair.split_once('=')?;
		record.insert(column.trim(), parse_value(value, params)?);
	}
	Some(record)
}

fn split_where(text: &str) -> (&str, Option<&str>) {
	match text.split_once(" WHERE ") {
		Some((head, tail)) => (head, Some(tail)),
		None => (text, None),
	}
}

fn parse_criteria(clause: Option<&str>, params: &[Value]) -> Option<Record> {
	match clause {
		Some(text) => parse_pairs(text, " AND ", params),
		None => Some(Record::new()),
	}
}

fn parse(statement: &SqlStatement) -> Option<Parsed> {
	let sql = statement.sql();
	let params = statement.params();
	if let Some(rest) = sql.strip_prefix("SELECT * FROM ") {
		let (table, clause) = split_where(rest);
		return Some(Parsed::Select {
			table: table.to_string(),
			criteria: parse_criteria(clause, params)?,
		});
	}
	if let Some(rest) = sql.strip_prefix("INSERT INTO ") {
		let (table, rest) = rest.split_once('(')?;
		let (columns, rest) = rest.split_once(") VALUES(")?;
		let values = rest.strip_suffix(')')?;
		let columns: Vec<&str> = columns.split(',').collect();
		let values: Vec<&str> = values.split(',').collect();
		if columns.len() != values.len() {
			return None;
		}
		let mut row = Record::new();
		for (column, value) in columns.into_iter().zip(values) {
			row.insert(column, parse_value(value, params)?);
		}
		return Some(Parsed::Insert {
			table: table.to_string(),
			row,
		});
	}
	if let Some(rest) = sql.strip_prefix("UPDATE ") {
		let (table, rest) = rest.split_once(" SET ")?;
		let (assignments, clause) = split_where(rest);
		return Some(Parsed::Update {
			table: table.to_string(),
			changes: parse_pairs(assignments, ",", params)?,
			criteria: parse_criteria(clause, params)?,
		});
	}
	if let Some(rest) = sql.strip_prefix("DELETE FROM ") {
		let (table, clause) = split_where(rest);
		return Some(Parsed::Delete {
			table: table.to_string(),
			criteria: parse_criteria(clause, params)?,
		});
	}
	None
}

/// In-memory relational driver
#[derive(Debug, Default)]
pub struct MemoryRelationalDriver {
	tables: Mutex<HashMap<String, Vec<Record>>>,
	statements: Mutex<Vec<SqlStatement>>,
	failing_values: Mutex<Vec<Value>>,
	delay: Option<Duration>,
	pub tracker: CallTracker,
}

impl MemoryRelationalDriver {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_table(self, name: &str) -> Self {
		self.tables
			.lock()
			.unwrap()
			.insert(name.to_string(), Vec::new());
		self
	}

	/// Hold every call for `delay` before answering
	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);
		self
	}

	/// Any insert carrying `value` fails with an execution error
	pub fn fail_inserts_containing(self, value: impl Into<Value>) -> Self {
		self.failing_values.lock().unwrap().push(value.into());
		self
	}

	pub fn rows(&self, table: &str) -> Vec<Record> {
		self.tables
			.lock()
			.unwrap()
			.get(table)
			.cloned()
			.unwrap_or_default()
	}

	pub fn statements(&self) -> Vec<SqlStatement> {
		self.statements.lock().unwrap().clone()
	}

	pub fn calls(&self) -> usize {
		self.tracker.calls()
	}

	async fn pause(&self) {
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}
	}

	fn apply(&self, statement: &SqlStatement) -> Result<(Vec<Record>, u64), BackendError> {
		self.statements.lock().unwrap().push(statement.clone());
		let parsed = parse(statement).ok_or_else(|| syntax(statement.sql()))?;
		let mut tables = self.tables.lock().unwrap();
		let missing = |table: &str| {
			BackendError::QuerySyntax(format!("relation \"{}\" does not exist", table))
		};
		match parsed {
			Parsed::Select { table, criteria } => {
				let rows = tables.get(&table).ok_or_else(|| missing(&table))?;
				let found: Vec<Record> = rows.iter().filter(|r| r.matches(&criteria)).cloned().collect();
				Ok((found, 0))
			}
			Parsed::Insert { table, row } => {
				let failing = self.failing_values.lock().unwrap();
				if row.iter().any(|(_, v)| failing.contains(v)) {
					return Err(BackendError::Execution("injected insert failure".to_string()));
				}
				let rows = tables.get_mut(&table).ok_or_else(|| missing(&table))?;
				rows.push(row);
				Ok((Vec::new(), 1))
			}
			Parsed::Update {
				table,
				changes,
				criteria,
			} => {
				let rows = tables.get_mut(&table).ok_or_else(|| missing(&table))?;
				let mut affected = 0;
				for row in rows.iter_mut().filter(|r| r.matches(&criteria)) {
					for (column, value) in changes.iter() {
						row.insert(column, value.clone());
					}
					affected += 1;
				}
				Ok((Vec::new(), affected))
			}
			Parsed::Delete { table, criteria } => {
				let rows = tables.get_mut(&table).ok_or_else(|| missing(&table))?;
				let before = rows.len();
				rows.retain(|r| !r.matches(&criteria));
				Ok((Vec::new(), (before - rows.len()) as u64))
			}
		}
	}
}

#[async_trait]
impl RelationalDriver for MemoryRelationalDriver {
	async fn fetch(
		&self,
		_config: &PostgresConfig,
		statement: &SqlStatement,
	) -> Result<Vec<Record>, BackendError> {
		self.tracker.enter();
		self.pause().await;
		let result = self.apply(statement).map(|(rows, _)| rows);
		self.tracker.leave();
		result
	}

	async fn commit(
		&self,
		_config: &PostgresConfig,
		statement: &SqlStatement,
	) -> Result<u64, BackendError> {
		self.tracker.enter();
		self.pause().await;
		let result = self.apply(statement).map(|(_, affected)| affected);
		self.tracker.leave();
		result
	}
}

fn document_matches(document: &Document, filter: &Document) -> bool {
	filter.iter().all(|(key, expected)| match (document.get(key), expected) {
		(Some(Bson::Int32(a)), Bson::Int64(b)) | (Some(Bson::Int64(b)), Bson::Int32(a)) => {
			i64::from(*a) == *b
		}
		(Some(actual), expected) => actual == expected,
		(None, _) => false,
	})
}

/// In-memory document driver
#[derive(Debug, Default)]
pub struct MemoryDocumentDriver {
	collections: Mutex<HashMap<String, Vec<Document>>>,
	updates: Mutex<Vec<Document>>,
	delay: Option<Duration>,
	pub tracker: CallTracker,
}

impl MemoryDocumentDriver {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);
		self
	}

	pub fn documents(&self, collection: &str) -> Vec<Document> {
		self.collections
			.lock()
			.unwrap()
			.get(collection)
			.cloned()
			.unwrap_or_default()
	}

	/// Update documents received, in call order
	pub fn updates(&self) -> Vec<Document> {
		self.updates.lock().unwrap().clone()
	}

	pub fn calls(&self) -> usize {
		self.tracker.calls()
	}

	async fn pause(&self) {
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}
	}
}

#[async_trait]
impl DocumentDriver for MemoryDocumentDriver {
	async fn find(
		&self,
		_target: &DocumentTarget,
		collection: &str,
		filter: Document,
	) -> Result<Vec<Document>, BackendError> {
		self.tracker.enter();
		self.pause().await;
		let found = self
			.documents(collection)
			.into_iter()
			.filter(|d| document_matches(d, &filter))
			.collect();
		self.tracker.leave();
		Ok(found)
	}

	async fn insert_one(
		&self,
		_target: &DocumentTarget,
		collection: &str,
		document: Document,
	) -> Result<(), BackendError> {
		self.tracker.enter();
		self.pause().await;
		self.collections
			.lock()
			.unwrap()
			.entry(collection.to_string())
			.or_default()
			.push(document);
		self.tracker.leave();
		Ok(())
	}

	async fn update_many(
		&self,
		_target: &DocumentTarget,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<u64, BackendError> {
		self.tracker.enter();
		self.pause().await;
		self.updates.lock().unwrap().push(update.clone());
		let result = match update.get_document("$set") {
			Ok(changes) => {
				let mut collections = self.collections.lock().unwrap();
				let mut modified = 0;
				for document in collections
					.entry(collection.to_string())
					.or_default()
					.iter_mut()
					.filter(|d| document_matches(d, &filter))
				{
					for (key, value) in changes.iter() {
						document.insert(key.clone(), value.clone());
					}
					modified += 1;
				}
				Ok(modified)
			}
			Err(_) => Err(BackendError::QuerySyntax(
				"update document requires atomic operators".to_string(),
			)),
		};
		self.tracker.leave();
		result
	}

	async fn delete_many(
		&self,
		_target: &DocumentTarget,
		collection: &str,
		filter: Document,
	) -> Result<u64, BackendError> {
		self.tracker.enter();
		self.pause().await;
		let mut collections = self.collections.lock().unwrap();
		let documents = collections.entry(collection.to_string()).or_default();
		let before = documents.len();
		documents.retain(|d| !document_matches(d, &filter));
		let deleted = (before - documents.len()) as u64;
		drop(collections);
		self.tracker.leave();
		Ok(deleted)
	}
}

pub fn shared<T>(value: T) -> Arc<T> {
	Arc::new(value)
}
