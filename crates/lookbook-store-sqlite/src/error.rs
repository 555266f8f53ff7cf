//! Error type for `lookbook-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("failed to parse stored timestamp: {0}")]
  Timestamp(String),

  /// The catalog has no `products` table, so there is nothing to
  /// normalize. Seed the catalog first.
  #[error("catalog has no products table")]
  MissingProductsTable,

  /// The `products` table carries neither a `department` nor a
  /// `department_id` column; this is not a catalog shape the migrator
  /// knows how to handle.
  #[error("products table has neither a department nor a department_id column")]
  UnrecognizedProductsShape,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
