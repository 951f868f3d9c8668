//! SQL exporter for entity tables and whole schemas.
//!
//! Identifiers are derived from validated lower camel case names, so they are
//! emitted unquoted in their snake case form.

use crate::config::SqlOptions;
use crate::error::SchemaError;
use crate::models::DataFormat;
use crate::relations::Relation;
use crate::relations::sql::table_storage_sql;
use crate::schema::Schema;

/// Exporter for PostgreSQL DDL
pub struct SchemaSqlExporter;

impl SchemaSqlExporter {
    /// Create statement for a data format's table.
    ///
    /// `foreign_key_relations` are the relations imposing a foreign key on the
    /// format; their constraint clauses follow the column definitions.
    /// Relations without SQL contribute nothing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use entity_store_sdk::config::SqlOptions;
    /// use entity_store_sdk::export::SchemaSqlExporter;
    /// use entity_store_sdk::models::{DataFormat, Field};
    ///
    /// let format = DataFormat::new("userGroup", vec![Field::serial("id")]);
    /// let options = SqlOptions::new().with_tablespace(None).with_owner(None);
    ///
    /// let sql = SchemaSqlExporter::create_table_sql(&format, &[], &options);
    /// assert_eq!(
    ///     sql,
    ///     "CREATE TABLE IF NOT EXISTS public.user_group\n(\n    id SERIAL PRIMARY KEY\n);"
    /// );
    /// ```
    pub fn create_table_sql(
        format: &DataFormat,
        foreign_key_relations: &[&Relation],
        options: &SqlOptions,
    ) -> String {
        let qualified = options.qualified(&format.table_name());

        let mut definitions: Vec<String> = format
            .fields
            .iter()
            .map(|field| format!("    {}", field.column_definition()))
            .collect();
        definitions.extend(
            foreign_key_relations
                .iter()
                .filter_map(|relation| relation.foreign_key_sql())
                .map(str::to_string),
        );

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {}\n(\n{}\n)",
            qualified,
            definitions.join(",\n")
        );
        sql.push_str(&table_storage_sql(&qualified, options));
        sql
    }

    /// Drop statement for a data format's table
    pub fn drop_table_sql(format: &DataFormat, options: &SqlOptions) -> String {
        format!(
            "drop table if exists {};",
            options.qualified(&format.table_name())
        )
    }

    /// DDL script creating every table of the schema: entity tables in
    /// provisioning order, then join tables in declaration order.
    pub fn export(schema: &Schema) -> Result<String, SchemaError> {
        let options = schema.sql_options();
        let mut statements = Vec::new();

        for name in schema.provisioning_order()? {
            let format = schema.require_data_format(&name)?;
            let foreign_keys = schema.relations().imposing_foreign_key_on(&name);
            statements.push(Self::create_table_sql(format, &foreign_keys, options));
        }

        statements.extend(
            schema
                .relations()
                .join_tables()
                .map(|join_table| join_table.create_join_table_sql.clone()),
        );

        Ok(Self::script(statements))
    }

    /// DDL script dropping every table of the schema, in reverse creation order
    pub fn export_drop(schema: &Schema) -> Result<String, SchemaError> {
        let options = schema.sql_options();

        let mut statements: Vec<String> = schema
            .relations()
            .join_tables()
            .map(|join_table| join_table.drop_join_table_sql.clone())
            .collect();
        statements.reverse();

        for name in schema.provisioning_order()?.iter().rev() {
            let format = schema.require_data_format(name)?;
            statements.push(Self::drop_table_sql(format, options));
        }

        Ok(Self::script(statements))
    }

    fn script(statements: Vec<String>) -> String {
        let mut script = statements.join("\n\n");
        if !script.is_empty() {
            script.push('\n');
        }
        script
    }
}
