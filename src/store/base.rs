//! Base CRUD operations on a single data format's table

use crate::config::SqlOptions;
use crate::db::{Database, Record};
use crate::error::StoreError;
use crate::models::{DataFormat, DataType};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Single-table operations. Field names are the data format's declared
/// names; returned records use the same keys in column order.
#[derive(Clone)]
pub struct BaseStore {
    data_format: DataFormat,
    table: String,
    columns: String,
    db: Arc<dyn Database>,
}

impl fmt::Debug for BaseStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseStore")
            .field("data_format", &self.data_format.name)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl BaseStore {
    pub fn new(data_format: DataFormat, db: Arc<dyn Database>, options: &SqlOptions) -> Self {
        let table = options.qualified(&data_format.table_name());
        let columns = data_format.column_names().join(", ");
        Self {
            data_format,
            table,
            columns,
            db,
        }
    }

    pub fn data_format(&self) -> &DataFormat {
        &self.data_format
    }

    /// Schema-qualified table name
    pub fn table(&self) -> &str {
        &self.table
    }

    fn column(&self, field_name: &str) -> Result<String, StoreError> {
        self.data_format
            .field(field_name)
            .map(|field| field.column_name())
            .ok_or_else(|| StoreError::UnknownField {
                data_format: self.data_format.name.clone(),
                field_name: field_name.to_string(),
            })
    }

    fn select_by_sql(&self, column: &str) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} = $1",
            self.columns, self.table, column
        )
    }

    /// Every row of the table
    pub async fn get_all(&self) -> Result<Vec<Record>, StoreError> {
        let sql = format!("SELECT {} FROM {}", self.columns, self.table);
        let rows = self.db.query_get_rows(&sql, &[]).await?;
        Ok(rows
            .into_iter()
            .map(|row| self.data_format.record_from_row(row))
            .collect())
    }

    /// First row whose field equals the value
    pub async fn get_by(
        &self,
        field_name: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Record>, StoreError> {
        let sql = self.select_by_sql(&self.column(field_name)?);
        let row = self.db.query_get_first_row(&sql, &[value.into()]).await?;
        Ok(row.map(|row| self.data_format.record_from_row(row)))
    }

    /// Every row whose field equals the value
    pub async fn get_many_by(
        &self,
        field_name: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Record>, StoreError> {
        let sql = self.select_by_sql(&self.column(field_name)?);
        let rows = self.db.query_get_rows(&sql, &[value.into()]).await?;
        Ok(rows
            .into_iter()
            .map(|row| self.data_format.record_from_row(row))
            .collect())
    }

    /// Insert a record and return the stored row.
    ///
    /// Fields missing from the record are left to the column default, which
    /// lets serial ids be assigned by the database.
    pub async fn add(&self, record: Record) -> Result<Option<Record>, StoreError> {
        let mut columns = Vec::new();
        let mut params = Vec::new();

        for field in &self.data_format.fields {
            if let Some(value) = record.get(&field.name) {
                if field.data_type == DataType::Serial && value.is_null() {
                    continue;
                }
                columns.push(field.column_name());
                params.push(value.clone());
            }
        }

        if let Some(unknown) = record.keys().find(|key| !self.data_format.has_field(key)) {
            return Err(StoreError::UnknownField {
                data_format: self.data_format.name.clone(),
                field_name: unknown.clone(),
            });
        }

        let sql = if columns.is_empty() {
            format!(
                "INSERT INTO {} DEFAULT VALUES RETURNING {}",
                self.table, self.columns
            )
        } else {
            let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
                self.table,
                columns.join(", "),
                placeholders.join(", "),
                self.columns
            )
        };

        let row = self.db.query_get_first_row(&sql, &params).await?;
        Ok(row.map(|row| self.data_format.record_from_row(row)))
    }

    /// Delete every row whose field equals the value, returning the deleted rows
    pub async fn delete_by(
        &self,
        field_name: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Record>, StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 RETURNING {}",
            self.table,
            self.column(field_name)?,
            self.columns
        );
        let rows = self.db.query_get_rows(&sql, &[value.into()]).await?;
        Ok(rows
            .into_iter()
            .map(|row| self.data_format.record_from_row(row))
            .collect())
    }
}
