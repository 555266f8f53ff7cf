//! Product rows: the catalog's denormalized input shape and its
//! normalized successor.
//!
//! The migration replaces exactly one column (`department`, free text)
//! with another (`department_id`, nullable reference); everything else on
//! a product row passes through untouched.

use serde::{Deserialize, Serialize};

/// A product as it exists before normalization: the department is a
/// free-text label on the row itself.
///
/// This is the seeding input shape and the read shape of a
/// not-yet-migrated catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSeed {
  pub id:                     i64,
  pub cost:                   f64,
  pub category:               String,
  pub name:                   String,
  pub brand:                  String,
  pub retail_price:           f64,
  /// Free-text department label. `None` and `""` both mean "no
  /// department" and survive migration as a null `department_id`.
  pub department:             Option<String>,
  pub sku:                    String,
  pub distribution_center_id: i64,
}

/// A product after normalization: the free-text label is replaced by a
/// nullable reference into `departments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id:                     i64,
  pub cost:                   f64,
  pub category:               String,
  pub name:                   String,
  pub brand:                  String,
  pub retail_price:           f64,
  pub department_id:          Option<i64>,
  pub sku:                    String,
  pub distribution_center_id: i64,
}

/// The joined read model: a product with its department resolved to a
/// display name.
///
/// Post-migration this comes from a `LEFT JOIN` on `departments`;
/// pre-migration the legacy text column fills the same field, so callers
/// render both schemas identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProduct {
  pub id:           i64,
  pub name:         String,
  pub brand:        String,
  pub category:     String,
  pub retail_price: f64,
  pub department:   Option<String>,
}
