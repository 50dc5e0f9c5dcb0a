//! SignDeck Shared Types and Catalog
//!
//! This crate contains the domain types and the single plan catalog definition
//! shared by every SignDeck consumer (server-side handlers and client UIs).

pub mod catalog;
pub mod error;
pub mod standard;
pub mod types;

pub use catalog::{Catalog, CatalogBuilder, Plan, PlanDefinition};
pub use error::*;
pub use standard::{standard_catalog, STANDARD_CATALOG_VERSION};
pub use types::*;
