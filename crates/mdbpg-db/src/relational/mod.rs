//! Relational (SQL) store

pub mod driver;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod store;
pub mod translator;

pub use driver::RelationalDriver;
#[cfg(feature = "postgres")]
pub use postgres::PostgresDriver;
pub use store::{RelationalStore, SqlMode};
pub use translator::{SqlStatement, SqlTranslator};
