//! The schema migrator: turns the denormalized single-table catalog
//! into the normalized two-table catalog with referential integrity.
//!
//! Seven strictly ordered steps. Steps 1 through 5 are individually
//! idempotent; step 6 runs its create/copy/drop/rename sequence inside
//! one transaction, so a reader never observes a database with zero or
//! two product tables. Re-running after a full success is a no-op apart
//! from re-verification.

use lookbook_core::migrate::{
  DepartmentProductCount, MigrationReport, MigrationStep, VerificationReport,
};
use tracing::{info, warn};

use crate::{CatalogStore, Error, Result, schema};

// ─── Failure ───────────────────────────────────────────────────────────────

/// Terminal state of a failed migration run: the step that failed and
/// the underlying cause. Steps after the failing one never ran.
#[derive(Debug, thiserror::Error)]
#[error("migration failed at step {} ({}): {}", .step.number(), .step, .source)]
pub struct MigrateError {
  pub step:   MigrationStep,
  #[source]
  pub source: Error,
}

fn at(step: MigrationStep) -> impl FnOnce(Error) -> MigrateError {
  move |source| MigrateError { step, source }
}

// ─── Migrator ──────────────────────────────────────────────────────────────

/// Runs the normalization sequence against one [`CatalogStore`].
///
/// Holds a clone of the store handle, so all steps go through the same
/// database thread in submission order.
pub struct Migrator {
  store: CatalogStore,
}

/// What step 2 found. When the legacy column is already gone, an
/// earlier run completed the rebuild and steps 5 and 6 have nothing
/// left to do.
struct ExtractedLabels {
  labels:         Vec<String>,
  legacy_present: bool,
}

/// Outcome of step 4.
enum ColumnAdd {
  Added,
  AlreadyPresent,
}

impl Migrator {
  pub fn new(store: CatalogStore) -> Self {
    Migrator { store }
  }

  /// Execute all seven steps in order.
  ///
  /// Stops at the first step that fails and reports which one; a
  /// failure in the step-7 verification queries alone does not fail
  /// the run.
  pub async fn run(&self) -> Result<MigrationReport, MigrateError> {
    use MigrationStep as Step;

    self
      .ensure_departments_table()
      .await
      .map_err(at(Step::CreateDepartmentsTable))?;

    let extracted = self.extract_labels().await.map_err(at(Step::ExtractLabels))?;

    let departments_inserted = self
      .populate_departments(&extracted.labels)
      .await
      .map_err(at(Step::PopulateDepartments))?;

    let column_added = matches!(
      self
        .add_department_column()
        .await
        .map_err(at(Step::AddDepartmentColumn))?,
      ColumnAdd::Added
    );

    let products_linked = if extracted.legacy_present {
      self.backfill().await.map_err(at(Step::Backfill))?
    } else {
      info!(step = 5, "legacy column already gone; nothing to backfill");
      0
    };

    let products_copied = if extracted.legacy_present {
      let copied = self
        .enforce_foreign_key()
        .await
        .map_err(at(Step::EnforceForeignKey))?;
      Some(copied)
    } else {
      info!(step = 6, "foreign key already enforced by an earlier run");
      None
    };

    let verification = match self.verify().await {
      Ok(report) => Some(report),
      Err(error) => {
        warn!(%error, "verification queries failed; migration itself succeeded");
        None
      },
    };

    Ok(MigrationReport {
      distinct_labels: extracted.labels.len(),
      departments_inserted,
      column_added,
      products_linked,
      products_copied,
      verification,
    })
  }

  /// Step 1: create the departments table if it does not exist.
  async fn ensure_departments_table(&self) -> Result<()> {
    self
      .store
      .conn
      .call(|conn| {
        conn.execute_batch(schema::DEPARTMENTS)?;
        Ok(())
      })
      .await?;
    info!(step = 1, "departments table ready");
    Ok(())
  }

  /// Step 2: collect the distinct legacy labels, skipping null and
  /// empty values.
  ///
  /// Also the point where the catalog's shape is checked: a products
  /// table with a `department_id` column but no `department` column was
  /// already normalized, and extraction yields nothing. A table with
  /// neither column, or no products table at all, is a structural error.
  async fn extract_labels(&self) -> Result<ExtractedLabels> {
    let has_legacy = self.store.has_column("products", "department").await?;
    if !has_legacy {
      if !self.store.has_column("products", "department_id").await? {
        let columns = self.store.table_columns("products").await?;
        return Err(if columns.is_empty() {
          Error::MissingProductsTable
        } else {
          Error::UnrecognizedProductsShape
        });
      }
      info!(step = 2, "products already normalized; no labels to extract");
      return Ok(ExtractedLabels { labels: Vec::new(), legacy_present: false });
    }

    let labels: Vec<String> = self
      .store
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT department FROM products
           WHERE department IS NOT NULL AND department != ''",
        )?;
        let labels = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(labels)
      })
      .await?;

    info!(step = 2, labels = labels.len(), "extracted distinct department labels");
    Ok(ExtractedLabels { labels, legacy_present: true })
  }

  /// Step 3: insert the labels as department names, ignoring names that
  /// already exist. Returns the number of rows actually inserted.
  async fn populate_departments(&self, labels: &[String]) -> Result<u64> {
    if labels.is_empty() {
      info!(step = 3, "no labels to insert");
      return Ok(0);
    }

    let labels = labels.to_vec();
    let inserted = self
      .store
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0_u64;
        {
          let mut stmt =
            tx.prepare("INSERT OR IGNORE INTO departments (name) VALUES (?1)")?;
          for label in &labels {
            inserted += stmt.execute(rusqlite::params![label])? as u64;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    info!(step = 3, inserted, "populated departments");
    Ok(inserted)
  }

  /// Step 4: add the nullable `department_id` column to products.
  ///
  /// SQLite reports a re-run as a "duplicate column name" error; that
  /// exact error counts as success. Anything else is fatal.
  async fn add_department_column(&self) -> Result<ColumnAdd> {
    let outcome = self
      .store
      .conn
      .call(|conn| {
        let added =
          conn.execute("ALTER TABLE products ADD COLUMN department_id INTEGER", []);
        match added {
          Ok(_) => Ok(ColumnAdd::Added),
          Err(error) if is_duplicate_column(&error) => Ok(ColumnAdd::AlreadyPresent),
          Err(error) => Err(error.into()),
        }
      })
      .await?;

    match outcome {
      ColumnAdd::Added => info!(step = 4, "added department_id column"),
      ColumnAdd::AlreadyPresent => {
        info!(step = 4, "department_id column already present")
      },
    }
    Ok(outcome)
  }

  /// Step 5: point each product at the department whose name equals its
  /// legacy label, byte for byte. Null and empty labels stay unlinked.
  /// A pure function of the current table contents, so re-runs converge
  /// on the same assignment.
  async fn backfill(&self) -> Result<u64> {
    let updated = self
      .store
      .conn
      .call(|conn| {
        let updated = conn.execute(
          "UPDATE products
           SET department_id = (
             SELECT id FROM departments
             WHERE departments.name = products.department
           )
           WHERE department IS NOT NULL AND department != ''",
          [],
        )?;
        Ok(updated as u64)
      })
      .await?;

    info!(step = 5, updated, "backfilled department_id from legacy labels");
    Ok(updated)
  }

  /// Step 6: rebuild products with the foreign key and without the
  /// legacy column.
  ///
  /// SQLite cannot add a constraint to an existing table, so the step
  /// creates the target shape under a scratch name, copies every row,
  /// drops the old table, and renames. All four statements run in one
  /// transaction: if any of them fails, the original table is untouched.
  /// On a store that supported adding constraints in place this whole
  /// step would collapse to a single `ALTER TABLE`.
  async fn enforce_foreign_key(&self) -> Result<u64> {
    let copied = self
      .store
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(schema::PRODUCTS_WITH_FK)?;
        let copied = tx.execute(
          "INSERT INTO products_new
           SELECT id, cost, category, name, brand, retail_price,
                  department_id, sku, distribution_center_id
           FROM products",
          [],
        )?;
        tx.execute("DROP TABLE products", [])?;
        tx.execute("ALTER TABLE products_new RENAME TO products", [])?;
        tx.commit()?;
        Ok(copied as u64)
      })
      .await?;

    info!(step = 6, copied, "rebuilt products with foreign key");
    Ok(copied)
  }

  /// Step 7: recompute the post-migration counts. Read-only; surprising
  /// numbers are for the caller to judge, not an error.
  pub async fn verify(&self) -> Result<VerificationReport> {
    let departments = self.store.department_count().await?;
    let linked_products = self.store.linked_product_count().await?;

    let distribution = self
      .store
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT d.name, COUNT(p.id)
           FROM departments d
           LEFT JOIN products p ON p.department_id = d.id
           GROUP BY d.id, d.name
           ORDER BY d.name",
        )?;
        let distribution = stmt
          .query_map([], |row| {
            Ok(DepartmentProductCount {
              name:     row.get(0)?,
              products: row.get::<_, i64>(1)? as u64,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(distribution)
      })
      .await?;

    info!(step = 7, departments, linked_products, "verification complete");
    Ok(VerificationReport { departments, linked_products, distribution })
  }
}

/// Matches SQLite's complaint about `ALTER TABLE ... ADD COLUMN` naming
/// a column that already exists.
fn is_duplicate_column(error: &rusqlite::Error) -> bool {
  matches!(
    error,
    rusqlite::Error::SqliteFailure(_, Some(message))
      if message.contains("duplicate column name")
  )
}
