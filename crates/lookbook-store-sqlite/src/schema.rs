//! SQL schema for the lookbook catalog.
//!
//! Unlike a store that owns one fixed schema, this crate deals with two:
//! the denormalized shape produced by seeding and the normalized shape
//! produced by the migration. Opening a store applies pragmas only and
//! creates no tables.

/// Connection-level pragmas, applied when a store is opened.
///
/// `foreign_keys = ON` is load-bearing for the migration: the rebuilt
/// products table declares a foreign key, and the copy into it must
/// fail (and roll back) on rows that would violate it.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// The denormalized catalog shape, as produced by seeding: one table
/// with a free-text `department` column. The migrator later replaces
/// that column with a `department_id` reference.
pub const LEGACY_PRODUCTS: &str = "
CREATE TABLE IF NOT EXISTS products (
    id                     INTEGER PRIMARY KEY,
    cost                   REAL,
    category               TEXT,
    name                   TEXT,
    brand                  TEXT,
    retail_price           REAL,
    department             TEXT,            -- free text; may be NULL or ''
    sku                    TEXT UNIQUE,
    distribution_center_id INTEGER
);
";

/// The departments reference table. `UNIQUE` on the name is what makes
/// re-population with `INSERT OR IGNORE` idempotent.
pub const DEPARTMENTS: &str = "
CREATE TABLE IF NOT EXISTS departments (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT UNIQUE NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
";

/// The normalized products shape, built under a scratch name because
/// SQLite cannot add a constraint to an existing table. The migrator
/// copies rows in, drops the old table, and renames this one over it.
pub const PRODUCTS_WITH_FK: &str = "
CREATE TABLE products_new (
    id                     INTEGER PRIMARY KEY,
    cost                   REAL,
    category               TEXT,
    name                   TEXT,
    brand                  TEXT,
    retail_price           REAL,
    department_id          INTEGER,
    sku                    TEXT UNIQUE,
    distribution_center_id INTEGER,
    FOREIGN KEY (department_id) REFERENCES departments(id)
);
";
