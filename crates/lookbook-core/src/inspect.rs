//! Read models for schema introspection (`PRAGMA table_info`).

use serde::{Deserialize, Serialize};

/// One column of a table, as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
  pub name:        String,
  /// Declared SQL type, e.g. `INTEGER`, `TEXT`, `REAL`.
  pub column_type: String,
  pub not_null:    bool,
  pub primary_key: bool,
}
