//! Models module for the SDK
//!
//! Defines the declarative inputs of the SDK: data formats with their fields,
//! field references, and relation declarations between fields.

pub mod data_format;
pub mod relation;

pub use data_format::{DataFormat, DataType, Field, FieldRef};
pub use relation::{
    ManyToManyDeclaration, OneToManyDeclaration, OneToOneDeclaration, RelationDeclaration,
    RelationRole, RelationType,
};
