//! Document (MongoDB) store

pub mod driver;
#[cfg(feature = "mongodb")]
pub mod mongodb;
pub mod store;
pub mod translator;

pub use driver::{DocumentDriver, DocumentTarget};
#[cfg(feature = "mongodb")]
pub use self::mongodb::MongoDriver;
pub use store::{DocumentStore, IntoDocument};
pub use translator::DocumentTranslator;
