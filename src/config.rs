//! SDK configuration types
//!
//! Configuration can be built in code (`SdkConfig::new().with_...`) or read
//! from a TOML file:
//!
//! ```toml
//! [sql]
//! enable_sql = true
//! schema = "public"
//! tablespace = "pg_default"
//! owner = "postgres"
//!
//! [stores]
//! duplicate_function_names = "fail"
//!
//! [database]
//! url = "postgres://localhost/app"
//! max_connections = 8
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(String),
}

/// Main SDK configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// SQL generation options
    pub sql: SqlOptions,
    /// Store generation options
    pub stores: StoreOptions,
    /// Database connection options
    pub database: DatabaseConfig,
}

impl SdkConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Set SQL options
    pub fn with_sql(mut self, sql: SqlOptions) -> Self {
        self.sql = sql;
        self
    }

    /// Set the duplicate function name policy
    pub fn with_duplicate_function_names(mut self, policy: DuplicateFunctionNamePolicy) -> Self {
        self.stores.duplicate_function_names = policy;
        self
    }

    /// Set the database URL
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database.url = Some(url.into());
        self
    }
}

/// Options for generated SQL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlOptions {
    /// Attach DDL to relations (false: declaration-only relations)
    pub enable_sql: bool,
    /// Schema qualifying every table
    pub schema: String,
    /// Tablespace clause for created tables, omitted when unset
    pub tablespace: Option<String>,
    /// Owner assigned after creating a table, omitted when unset
    pub owner: Option<String>,
}

impl Default for SqlOptions {
    fn default() -> Self {
        Self {
            enable_sql: true,
            schema: "public".to_string(),
            tablespace: Some("pg_default".to_string()),
            owner: Some("postgres".to_string()),
        }
    }
}

impl SqlOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable DDL generation for relations
    pub fn with_enable_sql(mut self, enable_sql: bool) -> Self {
        self.enable_sql = enable_sql;
        self
    }

    /// Set the schema name
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Set or clear the tablespace
    pub fn with_tablespace(mut self, tablespace: Option<String>) -> Self {
        self.tablespace = tablespace;
        self
    }

    /// Set or clear the owner
    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        self.owner = owner;
        self
    }

    /// Schema-qualified table name
    pub fn qualified(&self, table_name: &str) -> String {
        format!("{}.{}", self.schema, table_name)
    }
}

/// What to do when two relations produce the same accessor name on one store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateFunctionNamePolicy {
    /// Refuse to build the store
    #[default]
    Fail,
    /// Keep the accessor built last
    Overwrite,
}

/// Store generation options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub duplicate_function_names: DuplicateFunctionNamePolicy,
}

/// Database connection options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `postgres://user@localhost/app`
    pub url: Option<String>,
    /// Maximum pooled connections
    pub max_connections: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 8,
        }
    }
}
