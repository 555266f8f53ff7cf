//! Built-in demo catalog, in the denormalized shape the migration
//! starts from.

use lookbook_core::product::ProductSeed;

/// A small boutique inventory. Department labels arrive as free text,
/// including one empty string and one missing value, which is exactly
/// the dirtiness the normalization has to cope with.
pub fn catalog() -> Vec<ProductSeed> {
  #[rustfmt::skip]
  let rows: [(i64, &str, &str, &str, Option<&str>, f64, f64, i64); 23] = [
    (1,  "Quilted Parka",    "Northline",     "Outerwear",   Some("Women"), 61.20, 149.00, 1),
    (2,  "Wrap Midi Dress",  "Solstice",      "Dresses",     Some("Women"), 32.50,  89.00, 2),
    (3,  "High-Rise Jeans",  "Bluegrain",     "Denim",       Some("Women"), 29.90,  78.00, 1),
    (4,  "Silk Camisole",    "Velour & Vine", "Tops",        Some("Women"), 24.10,  65.00, 3),
    (5,  "Ribbed Cardigan",  "Harvest Knits", "Knitwear",    Some("Women"), 27.40,  72.00, 2),
    (6,  "Pleated Skirt",    "Solstice",      "Skirts",      Some("Women"), 21.30,  58.00, 4),
    (7,  "Ballet Flats",     "Stride",        "Shoes",       Some("Women"), 18.60,  49.00, 5),
    (8,  "Leather Tote",     "Fieldcraft",    "Accessories", Some("Women"), 52.00, 129.00, 3),
    (9,  "Linen Blazer",     "Atelier Nord",  "Outerwear",   Some("Women"), 47.80, 118.00, 2),
    (10, "Running Tights",   "Kinetic",       "Activewear",  Some("Women"), 15.10,  42.00, 6),
    (11, "Cashmere Scarf",   "Harvest Knits", "Accessories", Some("Women"), 38.00,  95.00, 4),
    (12, "Oxford Shirt",     "Harbor & Main", "Tops",        Some("Men"),   16.70,  45.00, 1),
    (13, "Selvedge Jeans",   "Bluegrain",     "Denim",       Some("Men"),   44.50, 110.00, 2),
    (14, "Merino Crewneck",  "Harvest Knits", "Knitwear",    Some("Men"),   33.20,  85.00, 3),
    (15, "Field Jacket",     "Northline",     "Outerwear",   Some("Men"),   55.90, 135.00, 1),
    (16, "Chino Trousers",   "Harbor & Main", "Trousers",    Some("Men"),   23.60,  62.00, 5),
    (17, "Canvas Sneakers",  "Stride",        "Shoes",       Some("Men"),   20.40,  55.00, 6),
    (18, "Leather Belt",     "Fieldcraft",    "Accessories", Some("Men"),   14.30,  38.00, 4),
    (19, "Performance Tee",  "Kinetic",       "Activewear",  Some("Men"),    9.80,  28.00, 7),
    (20, "Wool Overcoat",    "Atelier Nord",  "Outerwear",   Some("Men"),   88.40, 210.00, 2),
    (21, "Flannel Shirt",    "Harbor & Main", "Tops",        Some("Men"),   19.50,  52.00, 1),
    (22, "Canvas Tote",      "Fieldcraft",    "Accessories", Some(""),      10.90,  28.00, 5),
    (23, "Gift Card",        "Lookbook",      "Gifts",       None,          25.00,  25.00, 8),
  ];

  rows
    .into_iter()
    .map(
      |(id, name, brand, category, department, cost, retail_price, dc)| {
        ProductSeed {
          id,
          cost,
          category: category.into(),
          name: name.into(),
          brand: brand.into(),
          retail_price,
          department: department.map(Into::into),
          sku: format!("LB-{id:04}"),
          distribution_center_id: dc,
        }
      },
    )
    .collect()
}

#[cfg(test)]
mod tests {
  use super::catalog;

  #[test]
  fn demo_rows_have_unique_ids_and_skus() {
    let rows = catalog();
    let mut ids: Vec<_> = rows.iter().map(|r| r.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), rows.len());

    let mut skus: Vec<_> = rows.iter().map(|r| r.sku.clone()).collect();
    skus.sort();
    skus.dedup();
    assert_eq!(skus.len(), rows.len());
  }

  #[test]
  fn demo_covers_the_messy_label_cases() {
    let rows = catalog();
    assert!(rows.iter().any(|r| r.department.as_deref() == Some("")));
    assert!(rows.iter().any(|r| r.department.is_none()));
    assert!(rows.iter().any(|r| r.department.as_deref() == Some("Women")));
    assert!(rows.iter().any(|r| r.department.as_deref() == Some("Men")));
  }
}
