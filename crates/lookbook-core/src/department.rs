//! Department rows: the normalized home for what was a free-text label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog department.
///
/// Rows are created once, during migration, from the distinct labels
/// observed on products; this subsystem never updates them afterward.
/// `name` is unique and non-null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
  pub id:         i64,
  pub name:       String,
  /// Store-assigned creation timestamp (`DEFAULT CURRENT_TIMESTAMP`).
  pub created_at: DateTime<Utc>,
}
