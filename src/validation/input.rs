//! Identifier validation for data format, field and accessor names
//!
//! Names end up in generated SQL without quoting (after snake_case conversion)
//! and as store function keys, so they are restricted to a safe character set.
//!
//! # Security
//!
//! Only ASCII letters and digits are allowed in data format and field names,
//! which rules out quote characters, whitespace and statement separators.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// PostgreSQL truncates identifiers longer than this
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Lower camel case without consecutive capitals, so that the snake case
/// column name converts back to the same field name
static LOWER_CAMEL_CASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9]*(?:[A-Z][a-z0-9]+)*[A-Z]?$").expect("valid identifier pattern")
});

static FUNCTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid function name pattern"));

/// Error for a name that cannot be used as an identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{kind} name cannot be empty")]
    Empty { kind: &'static str },

    #[error("{kind} name '{name}' is too long (max {max} characters as a column or table name)")]
    TooLong {
        kind: &'static str,
        name: String,
        max: usize,
    },

    #[error("{kind} name '{name}' must be lower camel case (letters and digits, starting with a lowercase letter, no consecutive capitals)")]
    NotLowerCamelCase { kind: &'static str, name: String },

    #[error("Function name '{0}' may only contain letters, digits and underscores")]
    InvalidFunctionName(String),
}

fn validate_identifier(kind: &'static str, name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Empty { kind });
    }

    if !LOWER_CAMEL_CASE.is_match(name) {
        return Err(ValidationError::NotLowerCamelCase {
            kind,
            name: name.to_string(),
        });
    }

    if crate::naming::column_name(name).len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::TooLong {
            kind,
            name: name.to_string(),
            max: MAX_IDENTIFIER_LENGTH,
        });
    }

    Ok(())
}

/// Validate a data format name (`userAddress`)
pub fn validate_data_format_name(name: &str) -> Result<(), ValidationError> {
    validate_identifier("Data format", name)
}

/// Validate a field name (`createdByUserId`)
pub fn validate_field_name(name: &str) -> Result<(), ValidationError> {
    validate_identifier("Field", name)
}

/// Validate a generated table, column or constraint name against the
/// PostgreSQL identifier limit
pub fn validate_sql_identifier(kind: &'static str, identifier: &str) -> Result<(), ValidationError> {
    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::TooLong {
            kind,
            name: identifier.to_string(),
            max: MAX_IDENTIFIER_LENGTH,
        });
    }
    Ok(())
}

/// Validate an accessor name override
pub fn validate_function_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Empty { kind: "Function" });
    }
    if !FUNCTION_NAME.is_match(name) {
        return Err(ValidationError::InvalidFunctionName(name.to_string()));
    }
    Ok(())
}
