//! Database handle abstraction
//!
//! Defines the Database trait consumed by the generated stores and its implementations:
//! - PostgresDatabase: pooled PostgreSQL connections (feature `postgres-backend`)
//! - RecordingDatabase: records statements and answers from canned rows (dry runs, tests)

use async_trait::async_trait;
use serde_json::Value;

/// One row, keyed by column name
pub type Record = serde_json::Map<String, Value>;

/// Error type for database operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Conversion error: {0}")]
    Conversion(String),
}

/// Trait for database handles
///
/// Statements use positional `$n` parameters. Every call is one round trip; the
/// handle decides about pooling, timeouts and cancellation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run a statement and return all rows
    async fn query_get_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Record>, DbError>;

    /// Run a statement and return the first row, if any
    async fn query_get_first_row(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<Record>, DbError>;

    /// Run one or more parameterless statements separated by `;`
    async fn execute_batch(&self, sql: &str) -> Result<(), DbError>;
}

pub mod recording;

#[cfg(feature = "postgres-backend")]
pub mod postgres;

pub use recording::{QueryKind, RecordedQuery, RecordingDatabase};

#[cfg(feature = "postgres-backend")]
pub use postgres::PostgresDatabase;
