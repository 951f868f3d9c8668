//! Data format validation
//!
//! Checks names and uniqueness before any SQL is derived from the formats.

use super::input::{validate_data_format_name, validate_field_name};
use crate::error::SchemaError;
use crate::models::DataFormat;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Validate the data formats and key them by name, keeping their order
pub fn validate_data_formats(
    formats: Vec<DataFormat>,
) -> Result<IndexMap<String, DataFormat>, SchemaError> {
    let mut by_name = IndexMap::with_capacity(formats.len());
    let mut table_names = HashSet::new();

    for format in formats {
        validate_data_format_name(&format.name)?;

        if by_name.contains_key(&format.name) || !table_names.insert(format.table_name()) {
            return Err(SchemaError::DuplicateDataFormat(format.name));
        }

        let mut columns = HashSet::new();
        for field in &format.fields {
            validate_field_name(&field.name)?;
            if !columns.insert(field.column_name()) {
                return Err(SchemaError::DuplicateField {
                    data_format: format.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        by_name.insert(format.name.clone(), format);
    }

    Ok(by_name)
}
