//! Schema: validated data formats and relations
//!
//! A schema is built once, either in code or from a YAML/JSON document:
//!
//! ```yaml
//! data_formats:
//!   - name: user
//!     fields:
//!       - name: id
//!         data_type: serial
//!   - name: recipe
//!     fields:
//!       - name: id
//!         data_type: serial
//!       - name: createdByUserId
//!         data_type: integer
//! relations:
//!   - type: ONE_TO_MANY
//!     from_one_field: user.id
//!     to_many_field: recipe.createdByUserId
//! ```

use crate::config::SqlOptions;
use crate::error::SchemaError;
use crate::models::{DataFormat, RelationDeclaration};
use crate::relations::{RelationsDict, provisioning_order};
use crate::validation::{validate_data_formats, validate_relations};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Validated data formats, their relations and the SQL options used for DDL
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    data_formats: IndexMap<String, DataFormat>,
    relations: RelationsDict,
    sql_options: SqlOptions,
}

impl Schema {
    /// Validate the data formats and relation declarations and build the relations
    pub fn new(
        data_formats: Vec<DataFormat>,
        declarations: Vec<RelationDeclaration>,
        sql_options: SqlOptions,
    ) -> Result<Self, SchemaError> {
        let data_formats = validate_data_formats(data_formats)?;
        validate_relations(&data_formats, &declarations)?;
        let relations = RelationsDict::from_declarations(&declarations, &sql_options)?;

        info!(
            "Loaded schema with {} data formats and {} relations",
            data_formats.len(),
            relations.len()
        );

        Ok(Self {
            data_formats,
            relations,
            sql_options,
        })
    }

    pub fn data_formats(&self) -> &IndexMap<String, DataFormat> {
        &self.data_formats
    }

    pub fn data_format(&self, name: &str) -> Option<&DataFormat> {
        self.data_formats.get(name)
    }

    /// Like [`Schema::data_format`], failing with `UnknownDataFormat`
    pub fn require_data_format(&self, name: &str) -> Result<&DataFormat, SchemaError> {
        self.data_format(name)
            .ok_or_else(|| SchemaError::UnknownDataFormat(name.to_string()))
    }

    pub fn relations(&self) -> &RelationsDict {
        &self.relations
    }

    pub fn sql_options(&self) -> &SqlOptions {
        &self.sql_options
    }

    /// Data format names, referenced formats before the formats holding
    /// foreign keys to them
    pub fn provisioning_order(&self) -> Result<Vec<String>, SchemaError> {
        provisioning_order(
            self.data_formats.keys().map(String::as_str),
            &self.relations,
        )
    }
}

/// Serialized form of a schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub data_formats: Vec<DataFormat>,
    #[serde(default)]
    pub relations: Vec<RelationDeclaration>,
}

impl SchemaDocument {
    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(content).map_err(|e| SchemaError::Parse(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(content).map_err(|e| SchemaError::Parse(e.to_string()))
    }

    /// Read a document; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn to_yaml_string(&self) -> Result<String, SchemaError> {
        serde_yaml::to_string(self).map_err(|e| SchemaError::Parse(e.to_string()))
    }

    /// Validate the document into a schema
    pub fn into_schema(self, sql_options: SqlOptions) -> Result<Schema, SchemaError> {
        Schema::new(self.data_formats, self.relations, sql_options)
    }
}

impl From<&Schema> for SchemaDocument {
    fn from(schema: &Schema) -> Self {
        Self {
            data_formats: schema.data_formats.values().cloned().collect(),
            relations: schema
                .relations
                .iter()
                .map(|relation| relation.declaration.clone())
                .collect(),
        }
    }
}
