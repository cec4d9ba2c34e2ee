//! Connection settings for mdbpg stores
//!
//! Settings are resolved exactly once, either from process environment
//! variables or from a named TOML section file (`<dir>/<section>.toml`).
//! The resolved [`PostgresConfig`] / [`MongoConfig`] is then handed to a
//! store constructor; a resolution error leaves that store unusable.
//!
//! ## Environment variables
//!
//! | Backend  | Required                                                              | Optional                          |
//! |----------|-----------------------------------------------------------------------|-----------------------------------|
//! | Postgres | `POSTGRES_USERNAME`, `POSTGRES_PASSWORD`, `POSTGRES_HOSTNAME`, `POSTGRES_DBNAME` | `POSTGRES_PORT`          |
//! | MongoDB  | `MONGODB_USERNAME`, `MONGODB_PASSWORD`, `MONGODB_HOSTNAME`, `MONGODB_DBNAME`     | `MONGODB_AUTHSRC`, `MONGODB_SCHEME` |
//!
//! ## TOML section
//!
//! ```toml
//! # settings/database.toml
//! postgres_username = "app"
//! postgres_password = "secret"
//! postgres_hostname = "db.internal"
//! postgres_dbname = "app"
//!
//! mongodb_username = "app"
//! mongodb_password = "secret"
//! mongodb_hostname = "cluster0.example.net"
//! mongodb_authsrc = "admin"
//! mongodb_dbname = "app"
//! ```
//!
//! ```no_run
//! use mdbpg_conf::{PostgresConfig, SettingsDirectory, SettingsSource};
//!
//! let section = SettingsDirectory::new("settings").load_section("database")?;
//! let config = PostgresConfig::resolve(&SettingsSource::Section(section))?;
//! assert_eq!(config.port(), 5432);
//! # Ok::<(), mdbpg_conf::SettingsError>(())
//! ```

pub mod database;
pub mod env;
pub mod error;
pub mod sources;

pub use database::{MongoConfig, PostgresConfig};
pub use env::Env;
pub use error::SettingsError;
pub use sources::{SettingsDirectory, SettingsSection, SettingsSource, TomlFileSource};
