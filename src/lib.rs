//! Entity Store SDK - declarative data formats and relations compiled to SQL
//!
//! Provides unified interfaces for:
//! - Data format and relation declarations (YAML, JSON or code)
//! - Canonical relation names and relation DDL (join tables, foreign keys)
//! - Validation of schemas before any SQL is produced
//! - Per-format stores with base CRUD and generated relation accessors
//! - Whole-schema provisioning in foreign key dependency order
//! - Database handles (PostgreSQL, recording)

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod export;
pub mod models;
pub mod naming;
pub mod relations;
pub mod schema;
pub mod store;
pub mod validation;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use config::{DatabaseConfig, DuplicateFunctionNamePolicy, SdkConfig, SqlOptions, StoreOptions};
pub use db::{Database, DbError, Record, RecordingDatabase};
#[cfg(feature = "postgres-backend")]
pub use db::PostgresDatabase;
pub use entities::Entities;
pub use error::{SchemaError, StoreError};
pub use export::SchemaSqlExporter;
pub use models::{
    DataFormat, DataType, Field, FieldRef, ManyToManyDeclaration, OneToManyDeclaration,
    OneToOneDeclaration, RelationDeclaration, RelationRole, RelationType,
};
pub use relations::{
    Relation, RelationSql, RelationsDict, create_relation, relation_name,
    relations_imposing_foreign_key_on, relations_relevant_to,
};
pub use schema::{Schema, SchemaDocument};
pub use store::{
    EntityStoreOptions, RelatedRecords, RelationAccessor, RelationFunctionPlan, Store,
    create_entity_store, plan_relation_functions,
};
