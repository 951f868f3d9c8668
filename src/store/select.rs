//! SELECT statements behind relation accessors
//!
//! One builder per relation role. Every statement takes a single positional
//! parameter, the value of the local endpoint's field, and selects the columns
//! of the other endpoint's data format (aliased `r`). Many-to-many statements
//! go through the join table (aliased `j`).

use crate::config::SqlOptions;
use crate::error::SchemaError;
use crate::models::{
    DataFormat, FieldRef, ManyToManyDeclaration, OneToManyDeclaration, OneToOneDeclaration,
    RelationDeclaration, RelationRole,
};
use crate::relations::sql::{join_column_name, join_table_name};
use indexmap::IndexMap;

fn data_format<'a>(
    formats: &'a IndexMap<String, DataFormat>,
    name: &str,
) -> Result<&'a DataFormat, SchemaError> {
    formats
        .get(name)
        .ok_or_else(|| SchemaError::UnknownDataFormat(name.to_string()))
}

fn select_list(format: &DataFormat) -> String {
    format
        .column_names()
        .iter()
        .map(|column| format!("r.{}", column))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rows of `other`'s table whose `other` column equals the parameter
fn single_table_select_sql(
    formats: &IndexMap<String, DataFormat>,
    other: &FieldRef,
    options: &SqlOptions,
) -> Result<String, SchemaError> {
    let format = data_format(formats, &other.format_name)?;
    Ok(format!(
        "SELECT {} FROM {} r WHERE r.{} = $1",
        select_list(format),
        options.qualified(&format.table_name()),
        other.column_name()
    ))
}

/// Rows of `other`'s table linked through the join table to the local value
fn join_table_select_sql(
    formats: &IndexMap<String, DataFormat>,
    declaration: &ManyToManyDeclaration,
    local: &FieldRef,
    other: &FieldRef,
    options: &SqlOptions,
) -> Result<String, SchemaError> {
    let format = data_format(formats, &other.format_name)?;
    Ok(format!(
        "SELECT {} FROM {} r JOIN {} j ON j.{} = r.{} WHERE j.{} = $1",
        select_list(format),
        options.qualified(&format.table_name()),
        options.qualified(&join_table_name(declaration)),
        join_column_name(other),
        other.column_name(),
        join_column_name(local),
    ))
}

/// On the "from one" store: the "to one" record
pub fn one_to_one_from_one_select_sql(
    formats: &IndexMap<String, DataFormat>,
    declaration: &OneToOneDeclaration,
    options: &SqlOptions,
) -> Result<String, SchemaError> {
    single_table_select_sql(formats, &declaration.to_one_field, options)
}

/// On the "to one" store: the "from one" record
pub fn one_to_one_to_one_select_sql(
    formats: &IndexMap<String, DataFormat>,
    declaration: &OneToOneDeclaration,
    options: &SqlOptions,
) -> Result<String, SchemaError> {
    single_table_select_sql(formats, &declaration.from_one_field, options)
}

/// On the "from one" store: the "to many" records
pub fn one_to_many_from_one_select_sql(
    formats: &IndexMap<String, DataFormat>,
    declaration: &OneToManyDeclaration,
    options: &SqlOptions,
) -> Result<String, SchemaError> {
    single_table_select_sql(formats, &declaration.to_many_field, options)
}

/// On the "to many" store: the "from one" record
pub fn one_to_many_to_many_select_sql(
    formats: &IndexMap<String, DataFormat>,
    declaration: &OneToManyDeclaration,
    options: &SqlOptions,
) -> Result<String, SchemaError> {
    single_table_select_sql(formats, &declaration.from_one_field, options)
}

/// On field_ref1's store: the field_ref2 records
pub fn many_to_many_field_ref1_select_sql(
    formats: &IndexMap<String, DataFormat>,
    declaration: &ManyToManyDeclaration,
    options: &SqlOptions,
) -> Result<String, SchemaError> {
    join_table_select_sql(
        formats,
        declaration,
        &declaration.field_ref1,
        &declaration.field_ref2,
        options,
    )
}

/// On field_ref2's store: the field_ref1 records
pub fn many_to_many_field_ref2_select_sql(
    formats: &IndexMap<String, DataFormat>,
    declaration: &ManyToManyDeclaration,
    options: &SqlOptions,
) -> Result<String, SchemaError> {
    join_table_select_sql(
        formats,
        declaration,
        &declaration.field_ref2,
        &declaration.field_ref1,
        options,
    )
}

/// Select statement for the accessor of `role`, or `None` when the role does
/// not belong to the declaration's shape
pub fn relation_select_sql(
    formats: &IndexMap<String, DataFormat>,
    declaration: &RelationDeclaration,
    role: RelationRole,
    options: &SqlOptions,
) -> Option<Result<String, SchemaError>> {
    let sql = match (declaration, role) {
        (RelationDeclaration::OneToOne(d), RelationRole::OneToOneFromOne) => {
            one_to_one_from_one_select_sql(formats, d, options)
        }
        (RelationDeclaration::OneToOne(d), RelationRole::OneToOneToOne) => {
            one_to_one_to_one_select_sql(formats, d, options)
        }
        (RelationDeclaration::OneToMany(d), RelationRole::OneToManyFromOne) => {
            one_to_many_from_one_select_sql(formats, d, options)
        }
        (RelationDeclaration::OneToMany(d), RelationRole::OneToManyToMany) => {
            one_to_many_to_many_select_sql(formats, d, options)
        }
        (RelationDeclaration::ManyToMany(d), RelationRole::ManyToManyFieldRef1) => {
            many_to_many_field_ref1_select_sql(formats, d, options)
        }
        (RelationDeclaration::ManyToMany(d), RelationRole::ManyToManyFieldRef2) => {
            many_to_many_field_ref2_select_sql(formats, d, options)
        }
        _ => return None,
    };
    Some(sql)
}
