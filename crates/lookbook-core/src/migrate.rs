//! Migration step identity and report types.
//!
//! The migrator itself lives in `lookbook-store-sqlite`; these types are
//! its public vocabulary. A run walks the seven steps strictly in order
//! and ends either with a [`MigrationReport`] or with the failing step
//! and its cause.

use serde::{Deserialize, Serialize};

/// One step of the seven-step normalization sequence, in mandatory
/// order. Each step reads state written by its predecessor; the chain is
/// strictly linear, with no branching and no concurrency between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum MigrationStep {
  /// Create the departments table if it does not exist.
  #[strum(serialize = "create departments table")]
  CreateDepartmentsTable,
  /// Collect the distinct non-empty legacy department labels.
  #[strum(serialize = "extract department labels")]
  ExtractLabels,
  /// Insert the labels as department names, ignoring duplicates.
  #[strum(serialize = "populate departments")]
  PopulateDepartments,
  /// Add the nullable `department_id` column to products.
  #[strum(serialize = "add department_id column")]
  AddDepartmentColumn,
  /// Point each product at the department matching its legacy label.
  #[strum(serialize = "backfill department_id")]
  Backfill,
  /// Rebuild products with the foreign key and without the legacy
  /// column.
  #[strum(serialize = "enforce foreign key")]
  EnforceForeignKey,
  /// Recompute and report post-migration counts.
  #[strum(serialize = "verify")]
  Verify,
}

impl MigrationStep {
  /// 1-based position in the sequence, for progress output.
  pub fn number(self) -> u8 {
    match self {
      Self::CreateDepartmentsTable => 1,
      Self::ExtractLabels => 2,
      Self::PopulateDepartments => 3,
      Self::AddDepartmentColumn => 4,
      Self::Backfill => 5,
      Self::EnforceForeignKey => 6,
      Self::Verify => 7,
    }
  }

  /// Total number of steps, for `step N/M` progress output.
  pub const COUNT: u8 = 7;
}

/// What a completed migration did, step by step.
///
/// Counts are per-run: a re-run over an already-normalized catalog
/// reports zero labels, zero inserts, and no rebuild.
#[derive(Debug, Clone)]
pub struct MigrationReport {
  /// Distinct non-empty legacy labels found (step 2).
  pub distinct_labels:      usize,
  /// Department rows actually inserted (step 3); lower than
  /// `distinct_labels` when some already existed.
  pub departments_inserted: u64,
  /// Whether step 4 added the column (`false`: it already existed).
  pub column_added:         bool,
  /// Product rows pointed at a department by step 5.
  pub products_linked:      u64,
  /// Rows copied during the step-6 rebuild; `None` when the foreign key
  /// was already enforced by an earlier run.
  pub products_copied:      Option<u64>,
  /// Step-7 counts; `None` when the verification queries failed (the
  /// migration itself still succeeded by that point).
  pub verification:         Option<VerificationReport>,
}

/// Post-migration counts (step 7). Observational only: surprising
/// numbers (e.g. zero departments) are reported, never treated as
/// failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
  pub departments:     u64,
  /// Products with a non-null `department_id`.
  pub linked_products: u64,
  /// Per-department product counts via `LEFT JOIN`, ordered by name.
  pub distribution:    Vec<DepartmentProductCount>,
}

/// One row of the verification distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentProductCount {
  pub name:     String,
  pub products: u64,
}
