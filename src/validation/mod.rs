//! Validation functionality
//!
//! Provides validation logic for:
//! - Identifiers (data format, field and accessor names)
//! - Data formats (duplicate formats and fields)
//! - Relations (unknown field references, self references, join table collisions)

pub mod formats;
pub mod input;
pub mod relations;

pub use formats::validate_data_formats;
pub use input::{
    ValidationError, validate_data_format_name, validate_field_name, validate_sql_identifier,
};
pub use relations::validate_relations;
