// Cinema Catalog - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod import;
pub mod logging;
pub mod model;
pub mod schema;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use db::{count_rows, open_database, open_in_memory, setup_database};
pub use entities::{Actor, Movie};
pub use error::{CatalogError, Result};
pub use import::{import_files, import_records, import_relations, ImportReport, ImportSummary};
pub use model::{Record, RelatedRef, Relation};
pub use schema::{EntitySchema, FieldSet, FieldSpec, FieldType, FieldValue, RawFields, DATE_FORMAT};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
