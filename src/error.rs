//! Error types for schema loading and store operations

use crate::db::DbError;
use crate::models::FieldRef;
use crate::validation::input::ValidationError;
use thiserror::Error;

/// Errors raised while loading data formats and relations, or while building
/// stores from them. All of these surface at construction time, before any
/// SQL reaches the database.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Two data formats share a name
    #[error("Duplicate data format: {0}")]
    DuplicateDataFormat(String),

    /// A data format declares two fields with the same name
    #[error("Data format {data_format} declares field {field} more than once")]
    DuplicateField { data_format: String, field: String },

    /// A data format name that is not part of the schema
    #[error("Unknown data format: {0}")]
    UnknownDataFormat(String),

    /// A relation points at a format or field that does not exist
    #[error("Unknown field reference {field_ref} in relation {relation}")]
    UnknownFieldReference { relation: String, field_ref: FieldRef },

    /// Both ends of a relation are the same field
    #[error("Relation {0} references the same field on both ends")]
    SelfReferencingRelation(String),

    /// The same relation was declared twice
    #[error("Duplicate relation: {0}")]
    DuplicateRelation(String),

    /// Two many-to-many relations would share a join table
    #[error("Join table {join_table} is produced by both {first_relation} and {second_relation}")]
    DuplicateJoinTable {
        join_table: String,
        first_relation: String,
        second_relation: String,
    },

    /// Both join table columns of a many-to-many relation get the same name
    #[error("Join table columns of relation {relation} collide: {column}")]
    JoinColumnCollision { relation: String, column: String },

    /// Two relations produce the same accessor name on one store
    #[error(
        "Function name {function_name} on the {data_format} store is produced by both {first_relation} and {second_relation}"
    )]
    DuplicateRelationFunctionName {
        data_format: String,
        function_name: String,
        first_relation: String,
        second_relation: String,
    },

    /// Foreign keys between entity tables form a cycle, so no creation order exists
    #[error("Foreign keys form a cycle between data formats: {}", .0.join(", "))]
    ForeignKeyCycle(Vec<String>),

    /// A field reference that is not of the form `format.field`
    #[error("Invalid field reference '{0}', expected 'format.field'")]
    InvalidFieldRef(String),

    /// A data format or field name that cannot be turned into an identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] ValidationError),

    /// Schema document could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML or JSON schema document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SchemaError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            SchemaError::UnknownFieldReference { relation, field_ref } => {
                format!(
                    "Relation {relation} references {field_ref}, which is not declared.\n\n\
                    Hint: Check the data format and field names of the relation."
                )
            }
            SchemaError::DuplicateRelationFunctionName {
                data_format,
                function_name,
                first_relation,
                second_relation,
            } => {
                format!(
                    "Relations {first_relation} and {second_relation} both generate \
                    {function_name} on the {data_format} store.\n\n\
                    Hint: Give one of them an explicit accessor name."
                )
            }
            SchemaError::ForeignKeyCycle(formats) => {
                format!(
                    "Foreign keys form a cycle between: {}\n\n\
                    Hint: Turn one of the relations into a many-to-many relation.",
                    formats.join(", ")
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Errors raised by store functions
#[derive(Error, Debug)]
pub enum StoreError {
    /// No relation accessor with the given name
    #[error("Store for {data_format} has no function named {function_name}")]
    UnknownFunction {
        data_format: String,
        function_name: String,
    },

    /// A field name that the data format does not declare
    #[error("Data format {data_format} has no field named {field_name}")]
    UnknownField {
        data_format: String,
        field_name: String,
    },

    /// Database error, propagated unchanged
    #[error(transparent)]
    Database(#[from] DbError),
}
