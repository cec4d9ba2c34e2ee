//! Values, records and insert payloads shared by both stores

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A scalar column or field value
///
/// Columns of other types (JSON, enums and anything the server sends as
/// text) are read back as [`Value::String`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	/// NUMERIC/DECIMAL, kept exact
	Decimal(Decimal),
	Date(NaiveDate),
	Time(NaiveTime),
	/// TIMESTAMP without time zone
	Timestamp(NaiveDateTime),
	/// TIMESTAMPTZ, normalized to UTC
	TimestampTz(DateTime<Utc>),
	Uuid(Uuid),
	Bytes(Vec<u8>),
}

impl Value {
	/// Legacy SQL literal form: strings and other quoted types wrapped in
	/// single quotes, numbers and booleans bare. Nothing is escaped.
	pub fn to_sql_literal(&self) -> String {
		match self {
			Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Decimal(_) => {
				self.to_string()
			}
			other => format!("'{}'", other),
		}
	}

	pub fn is_string(&self) -> bool {
		matches!(self, Value::String(_))
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => write!(f, "NULL"),
			Value::Bool(b) => write!(f, "{}", b),
			Value::Int(i) => write!(f, "{}", i),
			Value::Float(v) => write!(f, "{}", v),
			Value::String(s) => write!(f, "{}", s),
			Value::Decimal(d) => write!(f, "{}", d),
			Value::Date(d) => write!(f, "{}", d),
			Value::Time(t) => write!(f, "{}", t),
			Value::Timestamp(ts) => write!(f, "{}", ts),
			Value::TimestampTz(ts) => write!(f, "{}", ts.to_rfc3339()),
			Value::Uuid(u) => write!(f, "{}", u),
			// bytea hex format
			Value::Bytes(bytes) => {
				write!(f, "\\x")?;
				bytes.iter().try_for_each(|b| write!(f, "{:02x}", b))
			}
		}
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::String(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::String(s)
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Int(i)
	}
}

impl From<i32> for Value {
	fn from(i: i32) -> Self {
		Value::Int(i as i64)
	}
}

impl From<i16> for Value {
	fn from(i: i16) -> Self {
		Value::Int(i as i64)
	}
}

impl From<u32> for Value {
	fn from(i: u32) -> Self {
		Value::Int(i as i64)
	}
}

impl From<f64> for Value {
	fn from(f: f64) -> Self {
		Value::Float(f)
	}
}

impl From<f32> for Value {
	fn from(f: f32) -> Self {
		Value::Float(f as f64)
	}
}

impl From<Decimal> for Value {
	fn from(d: Decimal) -> Self {
		Value::Decimal(d)
	}
}

impl From<NaiveDate> for Value {
	fn from(d: NaiveDate) -> Self {
		Value::Date(d)
	}
}

impl From<NaiveTime> for Value {
	fn from(t: NaiveTime) -> Self {
		Value::Time(t)
	}
}

impl From<NaiveDateTime> for Value {
	fn from(ts: NaiveDateTime) -> Self {
		Value::Timestamp(ts)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(ts: DateTime<Utc>) -> Self {
		Value::TimestampTz(ts)
	}
}

impl From<Uuid> for Value {
	fn from(u: Uuid) -> Self {
		Value::Uuid(u)
	}
}

impl From<Vec<u8>> for Value {
	fn from(bytes: Vec<u8>) -> Self {
		Value::Bytes(bytes)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Value::Null, Into::into)
	}
}

impl From<Value> for bson::Bson {
	fn from(value: Value) -> Self {
		use rust_decimal::prelude::ToPrimitive;

		match value {
			Value::Null => bson::Bson::Null,
			Value::Bool(b) => bson::Bson::Boolean(b),
			Value::Int(i) => bson::Bson::Int64(i),
			Value::Float(f) => bson::Bson::Double(f),
			Value::String(s) => bson::Bson::String(s),
			Value::Decimal(d) => d
				.to_f64()
				.map_or_else(|| bson::Bson::String(d.to_string()), bson::Bson::Double),
			Value::Date(d) => bson::Bson::DateTime(bson::DateTime::from_millis(
				d.and_time(NaiveTime::default()).and_utc().timestamp_millis(),
			)),
			Value::Timestamp(ts) => {
				bson::Bson::DateTime(bson::DateTime::from_millis(ts.and_utc().timestamp_millis()))
			}
			Value::TimestampTz(ts) => {
				bson::Bson::DateTime(bson::DateTime::from_millis(ts.timestamp_millis()))
			}
			Value::Time(t) => bson::Bson::String(t.to_string()),
			Value::Uuid(u) => bson::Bson::String(u.to_string()),
			Value::Bytes(bytes) => bson::Bson::Binary(bson::Binary {
				subtype: bson::spec::BinarySubtype::Generic,
				bytes,
			}),
		}
	}
}

/// Ordered column/field name to value mapping
///
/// Insertion order is kept, so clauses and column lists are generated in the
/// order the caller wrote them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, Value>);

/// Equality conditions, ANDed together
pub type Criteria = Record;

/// Assignments applied by an update
pub type Changes = Record;

impl Record {
	pub fn new() -> Self {
		Self(IndexMap::new())
	}

	/// Insert or replace a value, keeping the original position on replace
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(key.into(), value.into())
	}

	/// Builder-style [`Record::insert`]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(key, value);
		self
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Whether every entry of `criteria` is present here with an equal value
	pub fn matches(&self, criteria: &Criteria) -> bool {
		criteria.iter().all(|(k, v)| self.get(k) == Some(v))
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

impl IntoIterator for Record {
	type Item = (String, Value);
	type IntoIter = indexmap::map::IntoIter<String, Value>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl From<&Record> for bson::Document {
	fn from(record: &Record) -> Self {
		record
			.iter()
			.map(|(k, v)| (k.to_string(), bson::Bson::from(v.clone())))
			.collect()
	}
}

impl From<Record> for bson::Document {
	fn from(record: Record) -> Self {
		record
			.into_iter()
			.map(|(k, v)| (k, bson::Bson::from(v)))
			.collect()
	}
}

/// Build a [`Record`] from `key => value` pairs
///
/// # Examples
///
/// ```
/// use mdbpg_db::{record, Value};
///
/// let row = record! { "a" => true, "b" => 43, "c" => "x" };
/// assert_eq!(row.get("b"), Some(&Value::Int(43)));
/// assert_eq!(row.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
/// ```
#[macro_export]
macro_rules! record {
	() => {
		$crate::Record::new()
	};
	($($key:expr => $value:expr),+ $(,)?) => {{
		let mut record = $crate::Record::new();
		$(record.insert($key, $value);)+
		record
	}};
}

/// Payload of a relational insert: one row or an ordered sequence of rows
#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
	Single(Record),
	Many(Vec<Record>),
}

impl From<Record> for Rows {
	fn from(row: Record) -> Self {
		Rows::Single(row)
	}
}

impl From<Vec<Record>> for Rows {
	fn from(rows: Vec<Record>) -> Self {
		Rows::Many(rows)
	}
}

impl<const N: usize> From<[Record; N]> for Rows {
	fn from(rows: [Record; N]) -> Self {
		Rows::Many(rows.into())
	}
}
