//! # mdbpg
//!
//! Uniform CRUD access to a PostgreSQL database and a MongoDB database.
//!
//! Both stores take a table (or collection) name plus plain equality
//! criteria, and report failure through a sentinel (`None` / `false`) that is
//! also logged. Every store bounds the number of in-flight backend round
//! trips with its own connection gate.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL driver via `sqlx`
//! - `mongodb` (default) - MongoDB driver via the official `mongodb` crate
//!
//! ## Settings
//!
//! Connection settings come from the process environment or from a named
//! TOML section. See [`conf`] for the keys.
//!
//! ```no_run
//! use mdbpg::conf::{SettingsDirectory, SettingsSource};
//! use mdbpg::{DocumentStore, GateConfig, RelationalStore, record};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! mdbpg::logging::init()?;
//!
//! let pg = RelationalStore::postgres(&SettingsSource::environment(), GateConfig::default());
//! pg.insert("TESTTBL", record! { "a" => true, "b" => 43, "c" => "x" }).await;
//!
//! let section = SettingsDirectory::new("config").load_section("database")?;
//! let mongo = DocumentStore::mongodb(&section.into(), GateConfig::unlimited());
//! let docs = mongo.find("TESTCOL", &record! { "c" => "x" }).await;
//! # Ok(())
//! # }
//! ```

pub mod logging;

/// Settings resolution
pub use mdbpg_conf as conf;

/// Gated stores, translators and drivers
pub use mdbpg_db as db;

pub use mdbpg_conf::{MongoConfig, PostgresConfig, SettingsError, SettingsSource};
pub use mdbpg_db::{
	BackendError, Changes, ConnectionGate, Criteria, DocumentStore, ErrorCategory, GateConfig,
	PreconditionError, Record, RelationalStore, Rows, SqlMode, StoreError, Value, record,
};

#[cfg(feature = "postgres")]
pub use mdbpg_db::relational::PostgresDriver;

#[cfg(feature = "mongodb")]
pub use mdbpg_db::document::MongoDriver;
