//! Connection-gated CRUD stores
//!
//! Two facades share one shape. [`RelationalStore`] turns criteria and
//! changes into SQL for PostgreSQL; [`DocumentStore`] turns them into BSON
//! filter/update documents for MongoDB. Both bound concurrent round trips
//! with a [`ConnectionGate`] and open a fresh connection per operation.
//!
//! ```no_run
//! use mdbpg_conf::SettingsSource;
//! use mdbpg_db::gate::GateConfig;
//! use mdbpg_db::relational::RelationalStore;
//! use mdbpg_db::record;
//!
//! # async fn example() {
//! let store = RelationalStore::postgres(&SettingsSource::environment(), GateConfig::default());
//!
//! store.insert("TESTTBL", record! { "a" => true, "b" => 43, "c" => "x" }).await;
//! let rows = store.find("TESTTBL", &record! { "a" => true }).await;
//! # }
//! ```

pub mod document;
pub mod error;
pub mod gate;
pub mod relational;
pub mod types;

pub use document::{DocumentDriver, DocumentStore, DocumentTarget};
pub use error::{BackendError, ErrorCategory, PreconditionError, StoreError};
pub use gate::{ConnectionGate, GateConfig, GatePermit};
pub use relational::{RelationalDriver, RelationalStore, SqlMode, SqlStatement};
pub use types::{Changes, Criteria, Record, Rows, Value};
