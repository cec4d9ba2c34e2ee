//! Error types for gated stores
//!
//! Every store operation is implemented as `try_*` returning
//! `Result<T, StoreError>`. The public sentinel methods collapse that result
//! to `None`/`false` through [`settle`], which also logs the failure.

/// Failure reported by a backend driver or the connection gate
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
	/// Could not reach or talk to the server
	#[error("Connection error: {0}")]
	Connection(String),

	#[error("Authentication error: {0}")]
	Authentication(String),

	/// The server rejected the query text itself
	#[error("Query syntax error: {0}")]
	QuerySyntax(String),

	#[error("Execution error: {0}")]
	Execution(String),

	#[error("Serialization error: {0}")]
	Serialization(String),

	#[error("connection gate is closed")]
	GateClosed,
}

impl BackendError {
	pub fn is_query_syntax(&self) -> bool {
		matches!(self, Self::QuerySyntax(_))
	}

	pub fn is_connection(&self) -> bool {
		matches!(self, Self::Connection(_) | Self::Authentication(_))
	}
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for BackendError {
	fn from(err: sqlx::Error) -> Self {
		match &err {
			sqlx::Error::Database(db) => {
				let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
				// SQLSTATE class 42: syntax error or access rule violation
				if code.starts_with("42") {
					BackendError::QuerySyntax(err.to_string())
				} else if code.starts_with("08") {
					BackendError::Connection(err.to_string())
				} else if code.starts_with("28") {
					BackendError::Authentication(err.to_string())
				} else {
					BackendError::Execution(err.to_string())
				}
			}
			sqlx::Error::Io(_)
			| sqlx::Error::Tls(_)
			| sqlx::Error::Configuration(_)
			| sqlx::Error::PoolTimedOut
			| sqlx::Error::PoolClosed => BackendError::Connection(err.to_string()),
			sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::Encode(_) => {
				BackendError::Serialization(err.to_string())
			}
			_ => BackendError::Execution(err.to_string()),
		}
	}
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for BackendError {
	fn from(err: mongodb::error::Error) -> Self {
		use mongodb::error::ErrorKind;

		match *err.kind {
			ErrorKind::Authentication { .. } => BackendError::Authentication(err.to_string()),
			ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } | ErrorKind::DnsResolve { .. } => {
				BackendError::Connection(err.to_string())
			}
			ErrorKind::BsonSerialization(_) | ErrorKind::BsonDeserialization(_) => {
				BackendError::Serialization(err.to_string())
			}
			// BadValue (2) and FailedToParse (9) reject the filter/update document itself
			ErrorKind::Command(ref command) if command.code == 2 || command.code == 9 => {
				BackendError::QuerySyntax(err.to_string())
			}
			_ => BackendError::Execution(err.to_string()),
		}
	}
}

/// Input rejected before any backend call
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
	#[error("update requires at least one change")]
	EmptyChanges,

	#[error("delete without criteria is not permitted")]
	EmptyCriteria,

	#[error("cannot insert an empty row")]
	EmptyRow,

	#[error("cannot insert an empty sequence of rows")]
	EmptyRows,
}

/// Coarse error category observable by callers of `try_*` methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
	Configuration,
	Precondition,
	Backend,
}

/// Error returned by `try_*` store methods
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// Connection settings were missing when the store was built
	#[error("store is not configured")]
	NotConfigured,

	#[error(transparent)]
	Precondition(#[from] PreconditionError),

	#[error(transparent)]
	Backend(#[from] BackendError),

	/// Some rows of a multi-row insert failed; the others were committed
	#[error("{} of {} rows failed to insert", .failures.len(), .total)]
	PartialInsert {
		total: usize,
		failures: Vec<(usize, StoreError)>,
	},
}

impl StoreError {
	pub fn category(&self) -> ErrorCategory {
		match self {
			Self::NotConfigured => ErrorCategory::Configuration,
			Self::Precondition(_) => ErrorCategory::Precondition,
			Self::Backend(_) => ErrorCategory::Backend,
			Self::PartialInsert { failures, .. } => {
				if failures
					.iter()
					.all(|(_, e)| e.category() == ErrorCategory::Precondition)
				{
					ErrorCategory::Precondition
				} else {
					ErrorCategory::Backend
				}
			}
		}
	}

	/// The backend error, if this is one
	pub fn backend(&self) -> Option<&BackendError> {
		match self {
			Self::Backend(err) => Some(err),
			_ => None,
		}
	}

	/// Log at the level matching the category
	pub(crate) fn log(&self, operation: &str, target: &str) {
		match self {
			Self::Backend(err) => {
				tracing::error!(
					operation,
					target,
					error = %err,
					"an exception was thrown while trying to {} against '{}'",
					operation,
					target
				);
			}
			Self::PartialInsert { total, failures } => {
				tracing::error!(
					operation,
					target,
					failed = failures.len(),
					total,
					"multi-row {} against '{}' did not fully succeed",
					operation,
					target
				);
			}
			Self::Precondition(err) => {
				tracing::debug!(operation, target, error = %err, "rejected before contacting backend");
			}
			Self::NotConfigured => {
				tracing::debug!(operation, target, "store is not configured");
			}
		}
	}
}

/// Collapse a store result to its sentinel, logging the failure
pub(crate) fn settle<T>(operation: &str, target: &str, result: Result<T, StoreError>) -> Option<T> {
	match result {
		Ok(value) => Some(value),
		Err(err) => {
			err.log(operation, target);
			None
		}
	}
}
