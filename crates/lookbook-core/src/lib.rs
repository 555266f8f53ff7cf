//! Core types for the lookbook product catalog.
//!
//! Plain data: no database, no I/O. The store and CLI crates both build
//! on these definitions.

pub mod department;
pub mod inspect;
pub mod migrate;
pub mod product;
pub mod stats;
