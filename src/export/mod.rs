//! Export functionality
//!
//! Provides exporters for:
//! - SQL (entity tables, join tables, whole-schema scripts)

pub mod sql;

pub use sql::SchemaSqlExporter;
