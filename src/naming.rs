//! Naming conventions shared by the SQL generators and the store generator.
//!
//! Data formats and fields are declared in lower camel case (`userGroup`,
//! `createdByUserId`). Tables and columns are their snake case forms. Rows read
//! back from the database are re-keyed by the declared field names, see
//! [`DataFormat::record_from_row`](crate::models::DataFormat::record_from_row). The exact output of these functions ends up in SQL identifiers and
//! accessor names, so it must stay stable.

use heck::{ToLowerCamelCase, ToSnakeCase};

/// Table name for a data format name (`userGroup` -> `user_group`).
pub fn table_name(format_name: &str) -> String {
    format_name.to_snake_case()
}

/// Column name for a field name (`createdByUserId` -> `created_by_user_id`).
pub fn column_name(field_name: &str) -> String {
    field_name.to_snake_case()
}

/// Upper-cases the first character and leaves the rest untouched
/// (`userGroup` -> `UserGroup`).
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower camel case form of a column that no declared field owns
/// (`street_address` -> `streetAddress`).
pub fn undeclared_field_name(column_name: &str) -> String {
    column_name.to_lower_camel_case()
}
