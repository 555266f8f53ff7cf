//! The SQLite-backed catalog store.

use std::path::Path;

use lookbook_core::{
  department::Department,
  inspect::ColumnInfo,
  product::{Product, ProductSeed, ResolvedProduct},
  stats::{DepartmentPriceBands, DepartmentStats},
};
use rusqlite::OptionalExtension as _;

use crate::{Result, encode::RawDepartment, schema};

/// SQLite-backed store for the product catalog.
///
/// Cloning is cheap; the inner connection handle is reference-counted
/// and all clones share one database thread.
#[derive(Clone)]
pub struct CatalogStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl CatalogStore {
  /// Open a store at the given path, creating the database file if it
  /// does not exist. Applies connection pragmas but creates no tables;
  /// an empty catalog stays empty until seeded.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = CatalogStore { conn };
    store.apply_pragmas().await?;
    Ok(store)
  }

  /// Open a fresh in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = CatalogStore { conn };
    store.apply_pragmas().await?;
    Ok(store)
  }

  async fn apply_pragmas(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(schema::PRAGMAS)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count(&self, sql: &'static str) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, [], |row| row.get(0))?))
      .await?;
    Ok(count as u64)
  }

  // ─── Seeding ───────────────────────────────────────────────────────────────

  /// Load products into the denormalized catalog shape, creating the
  /// legacy table if needed. Rows are keyed by id, so re-seeding the
  /// same data replaces rather than duplicates. Returns the number of
  /// rows written.
  pub async fn seed(&self, products: &[ProductSeed]) -> Result<u64> {
    let products = products.to_vec();
    let written = self
      .conn
      .call(move |conn| {
        conn.execute_batch(schema::LEGACY_PRODUCTS)?;
        let tx = conn.transaction()?;
        let mut written = 0_u64;
        {
          let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO products
               (id, cost, category, name, brand, retail_price, department,
                sku, distribution_center_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          )?;
          for product in &products {
            written += stmt.execute(rusqlite::params![
              product.id,
              product.cost,
              product.category,
              product.name,
              product.brand,
              product.retail_price,
              product.department,
              product.sku,
              product.distribution_center_id,
            ])? as u64;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;
    Ok(written)
  }

  // ─── Counts ────────────────────────────────────────────────────────────────

  /// Total number of products in the catalog.
  pub async fn product_count(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM products").await
  }

  /// Total number of departments.
  pub async fn department_count(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM departments").await
  }

  /// Products that reference a department.
  pub async fn linked_product_count(&self) -> Result<u64> {
    self
      .count("SELECT COUNT(*) FROM products WHERE department_id IS NOT NULL")
      .await
  }

  /// Products left without a department reference (null or empty
  /// legacy labels stay unlinked).
  pub async fn unlinked_product_count(&self) -> Result<u64> {
    self
      .count("SELECT COUNT(*) FROM products WHERE department_id IS NULL")
      .await
  }

  // ─── Products ──────────────────────────────────────────────────────────────

  /// Products from the normalized catalog, ordered by id.
  pub async fn products(&self, limit: u32) -> Result<Vec<Product>> {
    let limit = limit as i64;
    let products = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, cost, category, name, brand, retail_price,
                  department_id, sku, distribution_center_id
           FROM products ORDER BY id LIMIT ?1",
        )?;
        let products = stmt
          .query_map([limit], |row| {
            Ok(Product {
              id:                     row.get(0)?,
              cost:                   row.get(1)?,
              category:               row.get(2)?,
              name:                   row.get(3)?,
              brand:                  row.get(4)?,
              retail_price:           row.get(5)?,
              department_id:          row.get(6)?,
              sku:                    row.get(7)?,
              distribution_center_id: row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(products)
      })
      .await?;
    Ok(products)
  }

  /// Products from the denormalized catalog, ordered by id. Only valid
  /// before the migration rebuilds the table.
  pub async fn legacy_products(&self, limit: u32) -> Result<Vec<ProductSeed>> {
    let limit = limit as i64;
    let products = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, cost, category, name, brand, retail_price,
                  department, sku, distribution_center_id
           FROM products ORDER BY id LIMIT ?1",
        )?;
        let products = stmt
          .query_map([limit], |row| {
            Ok(ProductSeed {
              id:                     row.get(0)?,
              cost:                   row.get(1)?,
              category:               row.get(2)?,
              name:                   row.get(3)?,
              brand:                  row.get(4)?,
              retail_price:           row.get(5)?,
              department:             row.get(6)?,
              sku:                    row.get(7)?,
              distribution_center_id: row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(products)
      })
      .await?;
    Ok(products)
  }

  /// Products with their department names, ordered by id. Unlinked
  /// products come back with no department.
  ///
  /// Works on both schemas: post-migration the name comes from the
  /// `LEFT JOIN` on departments, pre-migration from the legacy text
  /// column with empty labels nulled out. Callers render both the same.
  pub async fn resolved_products(&self, limit: u32) -> Result<Vec<ResolvedProduct>> {
    let sql = if self.has_column("products", "department_id").await? {
      "SELECT p.id, p.name, p.brand, p.category, p.retail_price, d.name
       FROM products p
       LEFT JOIN departments d ON p.department_id = d.id
       ORDER BY p.id LIMIT ?1"
    } else {
      "SELECT id, name, brand, category, retail_price, NULLIF(department, '')
       FROM products ORDER BY id LIMIT ?1"
    };

    let limit = limit as i64;
    let products = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let products = stmt
          .query_map([limit], |row| {
            Ok(ResolvedProduct {
              id:           row.get(0)?,
              name:         row.get(1)?,
              brand:        row.get(2)?,
              category:     row.get(3)?,
              retail_price: row.get(4)?,
              department:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(products)
      })
      .await?;
    Ok(products)
  }

  // ─── Departments & Statistics ──────────────────────────────────────────────

  /// All departments, ordered by id.
  pub async fn departments(&self) -> Result<Vec<Department>> {
    let raw = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, name, created_at FROM departments ORDER BY id")?;
        let raw = stmt
          .query_map([], |row| {
            Ok(RawDepartment {
              id:         row.get(0)?,
              name:       row.get(1)?,
              created_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(raw)
      })
      .await?;
    raw.into_iter().map(RawDepartment::into_department).collect()
  }

  /// Per-department aggregates over the joined catalog, ordered by
  /// department name. Departments with no products report zero counts
  /// and no prices.
  pub async fn department_stats(&self) -> Result<Vec<DepartmentStats>> {
    let stats = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT d.id, d.name,
                  COUNT(p.id),
                  COUNT(DISTINCT p.brand),
                  COUNT(DISTINCT p.category),
                  AVG(p.retail_price),
                  MIN(p.retail_price),
                  MAX(p.retail_price)
           FROM departments d
           LEFT JOIN products p ON p.department_id = d.id
           GROUP BY d.id, d.name
           ORDER BY d.name",
        )?;
        let stats = stmt
          .query_map([], |row| {
            Ok(DepartmentStats {
              id:                row.get(0)?,
              name:              row.get(1)?,
              product_count:     row.get::<_, i64>(2)? as u64,
              unique_brands:     row.get::<_, i64>(3)? as u64,
              unique_categories: row.get::<_, i64>(4)? as u64,
              avg_price:         row.get(5)?,
              min_price:         row.get(6)?,
              max_price:         row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stats)
      })
      .await?;
    Ok(stats)
  }

  /// Price-band breakdown per department, ordered by department name.
  pub async fn price_bands(&self) -> Result<Vec<DepartmentPriceBands>> {
    let bands = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT d.name,
                  COUNT(p.id),
                  COUNT(CASE WHEN p.retail_price > 50 THEN 1 END),
                  COUNT(CASE WHEN p.retail_price <= 50 THEN 1 END),
                  COUNT(CASE WHEN p.retail_price > 100 THEN 1 END)
           FROM departments d
           LEFT JOIN products p ON p.department_id = d.id
           GROUP BY d.id, d.name
           ORDER BY d.name",
        )?;
        let bands = stmt
          .query_map([], |row| {
            Ok(DepartmentPriceBands {
              name:       row.get(0)?,
              total:      row.get::<_, i64>(1)? as u64,
              expensive:  row.get::<_, i64>(2)? as u64,
              affordable: row.get::<_, i64>(3)? as u64,
              premium:    row.get::<_, i64>(4)? as u64,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(bands)
      })
      .await?;
    Ok(bands)
  }

  // ─── Introspection ─────────────────────────────────────────────────────────

  /// Names of user tables in the database, sorted.
  pub async fn table_names(&self) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT name FROM sqlite_master
           WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
           ORDER BY name",
        )?;
        let names = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
      })
      .await?;
    Ok(names)
  }

  /// Column descriptions for a table, in declaration order. Empty if
  /// the table does not exist.
  pub async fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
    let table = table.to_owned();
    let columns = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1)",
        )?;
        let columns = stmt
          .query_map([table], |row| {
            Ok(ColumnInfo {
              name:        row.get(0)?,
              column_type: row.get(1)?,
              not_null:    row.get::<_, i64>(2)? != 0,
              primary_key: row.get::<_, i64>(3)? != 0,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
      })
      .await?;
    Ok(columns)
  }

  /// Whether a table currently has a column with the given name.
  pub async fn has_column(&self, table: &str, column: &str) -> Result<bool> {
    let table = table.to_owned();
    let column = column.to_owned();
    let found = self
      .conn
      .call(move |conn| {
        let found: Option<i64> = conn
          .query_row(
            "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2",
            rusqlite::params![table, column],
            |row| row.get(0),
          )
          .optional()?;
        Ok(found.is_some())
      })
      .await?;
    Ok(found)
  }

  /// Row count for an arbitrary table. The name cannot be bound as a
  /// parameter, so it is quoted into the statement.
  pub async fn table_row_count(&self, table: &str) -> Result<u64> {
    let table = table.to_owned();
    let count: i64 = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT COUNT(*) FROM \"{}\"", table.replace('"', "\"\""));
        Ok(conn.query_row(&sql, [], |row| row.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }
}
