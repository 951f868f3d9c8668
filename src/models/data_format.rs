//! Data format model for the SDK
//!
//! A data format is the declarative description of one entity: a name, an
//! optional plural name and an ordered list of fields. Each field maps to one
//! column of the format's table.

use crate::db::Record;
use crate::error::SchemaError;
use crate::naming::{column_name, table_name, undeclared_field_name};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field data types and their PostgreSQL column types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Auto-incrementing integer primary key
    Serial,
    Integer,
    BigInt,
    Float,
    Boolean,
    Text,
    /// Variable length string, bounded by the field's `max_length` if present
    Varchar,
    Uuid,
    Date,
    Timestamp,
    TimestampTz,
    Json,
}

impl DataType {
    /// The SQL column type for this data type.
    pub fn sql_type(&self, max_length: Option<u32>) -> String {
        match self {
            DataType::Serial => "SERIAL".to_string(),
            DataType::Integer => "integer".to_string(),
            DataType::BigInt => "bigint".to_string(),
            DataType::Float => "double precision".to_string(),
            DataType::Boolean => "boolean".to_string(),
            DataType::Text => "text".to_string(),
            DataType::Varchar => match max_length {
                Some(length) => format!("character varying({})", length),
                None => "character varying".to_string(),
            },
            DataType::Uuid => "uuid".to_string(),
            DataType::Date => "date".to_string(),
            DataType::Timestamp => "timestamp without time zone".to_string(),
            DataType::TimestampTz => "timestamp with time zone".to_string(),
            DataType::Json => "jsonb".to_string(),
        }
    }
}

/// A single field of a data format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    /// Field name in lower camel case
    pub name: String,
    pub data_type: DataType,
    /// Maximum length, only meaningful for `varchar`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Whether the column accepts NULL (default: false)
    #[serde(default)]
    pub allow_null: bool,
    /// Whether the column carries a UNIQUE constraint (default: false)
    #[serde(default)]
    pub unique: bool,
}

impl Field {
    /// Create a new non-null field with the given name and data type
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            max_length: None,
            allow_null: false,
            unique: false,
        }
    }

    pub fn serial(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Serial)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Integer)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Text)
    }

    pub fn varchar(name: impl Into<String>, max_length: u32) -> Self {
        Self::new(name, DataType::Varchar).with_max_length(max_length)
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.allow_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Column name of this field (`streetAddress` -> `street_address`)
    pub fn column_name(&self) -> String {
        column_name(&self.name)
    }

    /// Column definition as it appears in a create table statement.
    ///
    /// Serial fields are always the primary key.
    pub fn column_definition(&self) -> String {
        let mut definition = format!(
            "{} {}",
            self.column_name(),
            self.data_type.sql_type(self.max_length)
        );

        if self.data_type == DataType::Serial {
            definition.push_str(" PRIMARY KEY");
            return definition;
        }

        if !self.allow_null {
            definition.push_str(" NOT NULL");
        }

        if self.unique {
            definition.push_str(" UNIQUE");
        }

        definition
    }
}

/// Reference to one field of one data format, written `format.field`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldRef {
    pub format_name: String,
    pub field_name: String,
}

impl FieldRef {
    pub fn new(format_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            format_name: format_name.into(),
            field_name: field_name.into(),
        }
    }

    /// Table holding the referenced field
    pub fn table_name(&self) -> String {
        table_name(&self.format_name)
    }

    /// Column of the referenced field
    pub fn column_name(&self) -> String {
        column_name(&self.field_name)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.format_name, self.field_name)
    }
}

impl FromStr for FieldRef {
    type Err = SchemaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once('.') {
            Some((format_name, field_name))
                if !format_name.is_empty()
                    && !field_name.is_empty()
                    && !field_name.contains('.') =>
            {
                Ok(Self::new(format_name.trim(), field_name.trim()))
            }
            _ => Err(SchemaError::InvalidFieldRef(value.to_string())),
        }
    }
}

impl TryFrom<String> for FieldRef {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldRef> for String {
    fn from(field_ref: FieldRef) -> Self {
        field_ref.to_string()
    }
}

/// A named entity schema: the table analogue of the SDK
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataFormat {
    /// Unique name in lower camel case
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural_name: Option<String>,
    pub fields: Vec<Field>,
}

impl DataFormat {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            plural_name: None,
            fields,
        }
    }

    pub fn with_plural_name(mut self, plural_name: impl Into<String>) -> Self {
        self.plural_name = Some(plural_name.into());
        self
    }

    /// Explicit plural name, or the name with an `s` appended
    pub fn pluralized_name(&self) -> String {
        self.plural_name
            .clone()
            .unwrap_or_else(|| format!("{}s", self.name))
    }

    pub fn table_name(&self) -> String {
        table_name(&self.name)
    }

    pub fn field(&self, field_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == field_name)
    }

    pub fn has_field(&self, field_name: &str) -> bool {
        self.field(field_name).is_some()
    }

    /// Reference to one of this format's fields, if it exists
    pub fn field_ref(&self, field_name: &str) -> Option<FieldRef> {
        self.field(field_name)
            .map(|f| FieldRef::new(self.name.clone(), f.name.clone()))
    }

    /// Column names in field order
    pub fn column_names(&self) -> Vec<String> {
        self.fields.iter().map(Field::column_name).collect()
    }

    /// Re-key a row read from this format's table by the declared field
    /// names. Columns no field owns fall back to their lower camel case form.
    pub fn record_from_row(&self, row: Record) -> Record {
        row.into_iter()
            .map(|(column, value)| {
                let key = self
                    .fields
                    .iter()
                    .find(|field| field.column_name() == column)
                    .map(|field| field.name.clone())
                    .unwrap_or_else(|| undeclared_field_name(&column));
                (key, value)
            })
            .collect()
    }
}
