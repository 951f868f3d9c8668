//! DDL for relations
//!
//! Pure functions over format and field names. The same declaration and
//! options always produce the same text.

use crate::config::SqlOptions;
use crate::models::{FieldRef, ManyToManyDeclaration, OneToManyDeclaration, OneToOneDeclaration};

/// Join table of a many-to-many relation: `{table1}_to_{table2}`
pub fn join_table_name(declaration: &ManyToManyDeclaration) -> String {
    format!(
        "{}_to_{}",
        declaration.field_ref1.table_name(),
        declaration.field_ref2.table_name()
    )
}

/// Join table column pointing at `field_ref`: `{table}_{column}`
pub fn join_column_name(field_ref: &FieldRef) -> String {
    format!("{}_{}", field_ref.table_name(), field_ref.column_name())
}

pub fn field_ref1_join_column_name(declaration: &ManyToManyDeclaration) -> String {
    join_column_name(&declaration.field_ref1)
}

pub fn field_ref2_join_column_name(declaration: &ManyToManyDeclaration) -> String {
    join_column_name(&declaration.field_ref2)
}

/// Constraint on a join table column: `{joinTable}_{column}_fkey`
pub fn join_constraint_name(join_table: &str, join_column: &str) -> String {
    format!("{}_{}_fkey", join_table, join_column)
}

/// Foreign key constraint on `local`'s table: `{localTable}_to_{foreignTable}_{localColumn}_fkey`
pub fn foreign_key_constraint_name(local: &FieldRef, foreign: &FieldRef) -> String {
    format!(
        "{}_to_{}_{}_fkey",
        local.table_name(),
        foreign.table_name(),
        local.column_name()
    )
}

/// Trailing tablespace and owner clauses for a created table
pub(crate) fn table_storage_sql(qualified_table: &str, options: &SqlOptions) -> String {
    let mut sql = String::new();
    if let Some(tablespace) = &options.tablespace {
        sql.push_str(&format!("\n\nTABLESPACE {}", tablespace));
    }
    sql.push(';');
    if let Some(owner) = &options.owner {
        sql.push_str(&format!(
            "\n\nALTER TABLE IF EXISTS {}\n    OWNER to {};",
            qualified_table, owner
        ));
    }
    sql
}

fn join_constraint_sql(
    join_table: &str,
    join_column: &str,
    referenced: &FieldRef,
    options: &SqlOptions,
) -> String {
    format!(
        "    CONSTRAINT {} FOREIGN KEY ({join_column})\n        \
        REFERENCES {} ({}) MATCH SIMPLE\n        \
        ON UPDATE NO ACTION\n        \
        ON DELETE NO ACTION",
        join_constraint_name(join_table, join_column),
        options.qualified(&referenced.table_name()),
        referenced.column_name(),
    )
}

/// Create statement for the join table of a many-to-many relation
pub fn create_join_table_sql(declaration: &ManyToManyDeclaration, options: &SqlOptions) -> String {
    let join_table = join_table_name(declaration);
    let qualified = options.qualified(&join_table);
    let column1 = field_ref1_join_column_name(declaration);
    let column2 = field_ref2_join_column_name(declaration);

    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS {qualified}\n(\n    \
        id SERIAL PRIMARY KEY,\n    \
        {column1} integer NOT NULL,\n    \
        {column2} integer NOT NULL,\n{},\n{}\n)",
        join_constraint_sql(&join_table, &column1, &declaration.field_ref1, options),
        join_constraint_sql(&join_table, &column2, &declaration.field_ref2, options),
    );
    sql.push_str(&table_storage_sql(&qualified, options));
    sql
}

/// Drop statement for the join table of a many-to-many relation
pub fn drop_join_table_sql(declaration: &ManyToManyDeclaration, options: &SqlOptions) -> String {
    format!(
        "drop table if exists {};",
        options.qualified(&join_table_name(declaration))
    )
}

/// Foreign key constraint clause placed in the create statement of `local`'s table
pub fn foreign_key_sql(local: &FieldRef, foreign: &FieldRef, options: &SqlOptions) -> String {
    let local_column = local.column_name();

    format!(
        "  constraint {} foreign key ({local_column})\n    \
        references {} ({}) match simple\n    \
        on update no action\n    \
        on delete no action",
        foreign_key_constraint_name(local, foreign),
        options.qualified(&foreign.table_name()),
        foreign.column_name(),
    )
}

/// The "to many" side references the "from one" side
pub fn one_to_many_foreign_key_sql(declaration: &OneToManyDeclaration, options: &SqlOptions) -> String {
    foreign_key_sql(&declaration.to_many_field, &declaration.from_one_field, options)
}

/// The "to one" side references the "from one" side
pub fn one_to_one_foreign_key_sql(declaration: &OneToOneDeclaration, options: &SqlOptions) -> String {
    foreign_key_sql(&declaration.to_one_field, &declaration.from_one_field, options)
}
