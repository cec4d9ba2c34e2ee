//! Criteria to BSON translation

use crate::error::PreconditionError;
use crate::types::{Changes, Criteria};
use bson::{Document, doc};

/// Translates criteria/changes mappings into native filter/update documents
///
/// # Examples
///
/// ```
/// use bson::doc;
/// use mdbpg_db::document::DocumentTranslator;
/// use mdbpg_db::record;
///
/// let update = DocumentTranslator.update(&record! { "b" => 13 }).unwrap();
/// assert_eq!(update, doc! { "$set": { "b": 13_i64 } });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTranslator;

impl DocumentTranslator {
	/// Equality filter; empty criteria matches every document
	pub fn filter(&self, criteria: &Criteria) -> Document {
		Document::from(criteria)
	}

	/// `{"$set": changes}`
	pub fn update(&self, changes: &Changes) -> Result<Document, PreconditionError> {
		if changes.is_empty() {
			return Err(PreconditionError::EmptyChanges);
		}
		Ok(doc! { "$set": Document::from(changes) })
	}
}
