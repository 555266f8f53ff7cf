//! Decoding from SQLite's stored representations into domain types.

use chrono::{DateTime, NaiveDateTime, Utc};
use lookbook_core::department::Department;

use crate::{Error, Result};

/// The text format SQLite writes for `DEFAULT CURRENT_TIMESTAMP`
/// values. Always UTC.
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a `CURRENT_TIMESTAMP` text value into a UTC datetime.
pub fn decode_timestamp(value: &str) -> Result<DateTime<Utc>> {
  NaiveDateTime::parse_from_str(value, SQLITE_TIMESTAMP_FORMAT)
    .map(|naive| naive.and_utc())
    .map_err(|e| Error::Timestamp(format!("{value:?}: {e}")))
}

/// A `departments` row as read from SQLite, before timestamp decoding.
pub struct RawDepartment {
  pub id:         i64,
  pub name:       String,
  pub created_at: String,
}

impl RawDepartment {
  pub fn into_department(self) -> Result<Department> {
    Ok(Department {
      id:         self.id,
      name:       self.name,
      created_at: decode_timestamp(&self.created_at)?,
    })
  }
}
