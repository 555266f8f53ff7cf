//! Subcommand implementations: thin glue between the store API and the
//! terminal.

use anyhow::Context as _;
use lookbook_core::migrate::MigrationStep;
use lookbook_store_sqlite::{CatalogStore, Migrator};

use crate::demo;

/// `lookbook seed`
pub async fn seed(store: &CatalogStore) -> anyhow::Result<()> {
  let rows = demo::catalog();
  let written = store.seed(&rows).await.context("seeding catalog")?;
  println!("seeded {written} products into the denormalized catalog");
  Ok(())
}

/// `lookbook migrate`
pub async fn migrate(store: &CatalogStore) -> anyhow::Result<()> {
  let report = Migrator::new(store.clone()).run().await?;

  println!("migration complete ({} steps)", MigrationStep::COUNT);
  println!("  distinct labels:      {}", report.distinct_labels);
  println!("  departments inserted: {}", report.departments_inserted);
  println!(
    "  column added:         {}",
    if report.column_added { "yes" } else { "no (already present)" }
  );
  println!("  products linked:      {}", report.products_linked);
  match report.products_copied {
    Some(copied) => println!("  products copied:      {copied}"),
    None => println!("  products copied:      0 (already rebuilt)"),
  }

  match &report.verification {
    Some(verification) => {
      println!("verification");
      println!("  departments:      {}", verification.departments);
      println!("  linked products:  {}", verification.linked_products);
      for row in &verification.distribution {
        println!("    {:<24} {:>6}", row.name, row.products);
      }
    },
    None => println!("verification queries failed; see the log"),
  }
  Ok(())
}

/// `lookbook products`
pub async fn products(
  store: &CatalogStore,
  limit: u32,
  json: bool,
) -> anyhow::Result<()> {
  let products = store
    .resolved_products(limit)
    .await
    .context("listing products")?;

  if json {
    println!("{}", serde_json::to_string_pretty(&products)?);
    return Ok(());
  }

  println!(
    "{:<4} {:<26} {:<16} {:<14} {:>8}  department",
    "id", "name", "brand", "category", "price"
  );
  for product in &products {
    println!(
      "{:<4} {:<26} {:<16} {:<14} {:>8.2}  {}",
      product.id,
      product.name,
      product.brand,
      product.category,
      product.retail_price,
      product.department.as_deref().unwrap_or("-"),
    );
  }
  Ok(())
}

/// `lookbook departments`
pub async fn departments(store: &CatalogStore, json: bool) -> anyhow::Result<()> {
  let departments = store.departments().await.context("listing departments")?;

  if json {
    println!("{}", serde_json::to_string_pretty(&departments)?);
    return Ok(());
  }

  println!("{:<4} {:<24} created", "id", "name");
  for department in &departments {
    println!(
      "{:<4} {:<24} {}",
      department.id,
      department.name,
      department.created_at.format("%Y-%m-%d %H:%M:%S"),
    );
  }
  Ok(())
}

/// `lookbook stats`
pub async fn stats(store: &CatalogStore, json: bool) -> anyhow::Result<()> {
  let stats = store
    .department_stats()
    .await
    .context("computing department statistics")?;
  let bands = store.price_bands().await.context("computing price bands")?;

  if json {
    let payload = serde_json::json!({
      "departments": stats,
      "price_bands": bands,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    return Ok(());
  }

  println!("department statistics");
  for entry in &stats {
    println!("  {} (#{})", entry.name, entry.id);
    println!("    products:   {}", entry.product_count);
    println!("    brands:     {}", entry.unique_brands);
    println!("    categories: {}", entry.unique_categories);
    match (entry.avg_price, entry.min_price, entry.max_price) {
      (Some(avg), Some(min), Some(max)) => {
        println!("    price:      avg {avg:.2}, min {min:.2}, max {max:.2}")
      },
      _ => println!("    price:      no products"),
    }
  }

  println!("price bands (over 50 / up to 50 / over 100)");
  for band in &bands {
    println!(
      "  {:<24} total {:>4}  {:>4} / {:>4} / {:>4}",
      band.name, band.total, band.expensive, band.affordable, band.premium,
    );
  }
  Ok(())
}

/// `lookbook verify`
pub async fn verify(store: &CatalogStore, json: bool) -> anyhow::Result<()> {
  let tables = store.table_names().await.context("listing tables")?;

  let mut inventory = Vec::new();
  for table in &tables {
    let columns = store.table_columns(table).await?;
    let rows = store.table_row_count(table).await?;
    inventory.push((table.clone(), columns, rows));
  }

  // The post-migration counts only make sense once both tables exist
  // and products carries the reference column.
  let migrated = tables.iter().any(|t| t == "departments")
    && store.has_column("products", "department_id").await?;
  let verification = if migrated {
    Some(Migrator::new(store.clone()).verify().await?)
  } else {
    None
  };
  let unlinked = if migrated {
    Some(store.unlinked_product_count().await?)
  } else {
    None
  };
  let sample = if tables.iter().any(|t| t == "products") {
    store.resolved_products(1).await?.into_iter().next()
  } else {
    None
  };

  if json {
    let tables_json = inventory
      .iter()
      .map(|(name, columns, rows)| {
        serde_json::json!({ "name": name, "rows": rows, "columns": columns })
      })
      .collect::<Vec<_>>();
    let payload = serde_json::json!({
      "tables": tables_json,
      "verification": verification,
      "unlinked_products": unlinked,
      "sample_product": sample,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    return Ok(());
  }

  for (name, columns, rows) in &inventory {
    println!("{name} ({rows} rows)");
    for column in columns {
      let mut notes = Vec::new();
      if column.primary_key {
        notes.push("pk");
      }
      if column.not_null {
        notes.push("not null");
      }
      if notes.is_empty() {
        println!("  {:<24} {}", column.name, column.column_type);
      } else {
        println!(
          "  {:<24} {} [{}]",
          column.name,
          column.column_type,
          notes.join(", "),
        );
      }
    }
  }

  match (&verification, unlinked) {
    (Some(verification), Some(unlinked)) => {
      println!("departments:     {}", verification.departments);
      println!(
        "linked products: {} ({unlinked} unlinked)",
        verification.linked_products,
      );
      for row in &verification.distribution {
        println!("  {:<24} {:>6}", row.name, row.products);
      }
    },
    _ => println!("catalog is not migrated yet (no department_id column)"),
  }

  if let Some(sample) = &sample {
    println!(
      "sample product: #{} {} ({}, {})",
      sample.id,
      sample.name,
      sample.brand,
      sample.department.as_deref().unwrap_or("no department"),
    );
  }
  Ok(())
}
