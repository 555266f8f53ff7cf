//! Per-department statistics computed over the normalized schema.
//!
//! These are the aggregates the catalog's consumers reconstruct with a
//! `LEFT JOIN` once departments live in their own table.

use serde::{Deserialize, Serialize};

/// Aggregates for one department.
///
/// Computed via `LEFT JOIN` so a department with no products still
/// appears, with zero counts and no price figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentStats {
  pub id:                i64,
  pub name:              String,
  pub product_count:     u64,
  pub unique_brands:     u64,
  pub unique_categories: u64,
  /// `None` when the department has no products.
  pub avg_price:         Option<f64>,
  pub min_price:         Option<f64>,
  pub max_price:         Option<f64>,
}

/// Product counts per retail-price band for one department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentPriceBands {
  pub name:       String,
  pub total:      u64,
  /// Retail price above $50.
  pub expensive:  u64,
  /// Retail price at or below $50.
  pub affordable: u64,
  /// Retail price above $100.
  pub premium:    u64,
}
