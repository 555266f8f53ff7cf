//! SQLite persistence for the lookbook catalog.
//!
//! All database access goes through [`tokio_rusqlite`], which runs the
//! underlying connection on a dedicated thread so async callers never
//! block on disk I/O.

mod encode;
mod schema;
mod store;

pub mod error;
pub mod migrate;

pub use error::{Error, Result};
pub use migrate::{MigrateError, Migrator};
pub use store::CatalogStore;

#[cfg(test)]
mod tests;
