//! Relation validation
//!
//! Validates relation declarations against the data formats they reference:
//! unknown formats or fields, relations from a field to itself, accessor name
//! overrides, and many-to-many relations whose join tables or join columns
//! would collide.

use super::input::{validate_function_name, validate_sql_identifier};
use crate::error::SchemaError;
use crate::models::{DataFormat, FieldRef, RelationDeclaration};
use crate::relations::{relation_name, sql};
use indexmap::IndexMap;
use std::collections::HashMap;

fn check_field_ref(
    formats: &IndexMap<String, DataFormat>,
    relation: &str,
    field_ref: &FieldRef,
) -> Result<(), SchemaError> {
    let exists = formats
        .get(&field_ref.format_name)
        .is_some_and(|format| format.has_field(&field_ref.field_name));

    if !exists {
        return Err(SchemaError::UnknownFieldReference {
            relation: relation.to_string(),
            field_ref: field_ref.clone(),
        });
    }
    Ok(())
}

fn overrides(declaration: &RelationDeclaration) -> [Option<&String>; 2] {
    match declaration {
        RelationDeclaration::ManyToMany(d) => [
            d.get_related_field_ref1_records_name.as_ref(),
            d.get_related_field_ref2_records_name.as_ref(),
        ],
        RelationDeclaration::OneToMany(d) => [
            d.get_related_from_one_record_name.as_ref(),
            d.get_related_to_many_records_name.as_ref(),
        ],
        RelationDeclaration::OneToOne(d) => [
            d.get_related_from_one_record_name.as_ref(),
            d.get_related_to_one_record_name.as_ref(),
        ],
    }
}

/// Generated table, column and constraint names must fit the identifier
/// limit. PostgreSQL would truncate longer ones, and two truncated names can
/// collide.
fn check_generated_identifiers(declaration: &RelationDeclaration) -> Result<(), SchemaError> {
    match declaration {
        RelationDeclaration::ManyToMany(d) => {
            let join_table = sql::join_table_name(d);
            validate_sql_identifier("Join table", &join_table)?;
            for column in [
                sql::field_ref1_join_column_name(d),
                sql::field_ref2_join_column_name(d),
            ] {
                validate_sql_identifier("Join column", &column)?;
                validate_sql_identifier(
                    "Constraint",
                    &sql::join_constraint_name(&join_table, &column),
                )?;
            }
        }
        RelationDeclaration::OneToMany(_) | RelationDeclaration::OneToOne(_) => {
            if let (Some(holder), Some(referenced)) =
                (declaration.foreign_key_holder(), declaration.referenced_field())
            {
                validate_sql_identifier(
                    "Constraint",
                    &sql::foreign_key_constraint_name(holder, referenced),
                )?;
            }
        }
    }
    Ok(())
}

/// Validate relation declarations against the data formats
pub fn validate_relations(
    formats: &IndexMap<String, DataFormat>,
    declarations: &[RelationDeclaration],
) -> Result<(), SchemaError> {
    // join table name -> relation that produces it
    let mut join_tables: HashMap<String, String> = HashMap::new();

    for declaration in declarations {
        let name = relation_name(declaration);
        let (first, second) = declaration.field_refs();

        check_field_ref(formats, &name, first)?;
        check_field_ref(formats, &name, second)?;

        if first == second {
            return Err(SchemaError::SelfReferencingRelation(name));
        }

        for function_name in overrides(declaration).into_iter().flatten() {
            validate_function_name(function_name)?;
        }

        check_generated_identifiers(declaration)?;

        if let RelationDeclaration::ManyToMany(d) = declaration {
            let column1 = sql::field_ref1_join_column_name(d);
            if column1 == sql::field_ref2_join_column_name(d) {
                return Err(SchemaError::JoinColumnCollision {
                    relation: name,
                    column: column1,
                });
            }

            let join_table = sql::join_table_name(d);
            if let Some(first_relation) = join_tables.get(&join_table) {
                if *first_relation != name {
                    return Err(SchemaError::DuplicateJoinTable {
                        join_table,
                        first_relation: first_relation.clone(),
                        second_relation: name,
                    });
                }
            }
            join_tables.insert(join_table, name);
        }
    }

    Ok(())
}
