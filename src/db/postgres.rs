//! PostgreSQL database handle
//!
//! Connections come from a deadpool pool. Parameters arrive as JSON values and
//! are bound with the Rust type matching the parameter type PostgreSQL inferred
//! for the prepared statement; result columns are converted back to JSON by
//! column type.

use super::{Database, DbError, Record};
use crate::config::DatabaseConfig;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use deadpool_postgres::{Pool, PoolConfig, Runtime};
use serde_json::Value;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{NoTls, Row};
use tracing::{debug, info};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// PostgreSQL database handle (async, pooled)
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: Pool,
}

impl PostgresDatabase {
    /// Create a pool for the configured database URL
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let url = config
            .url
            .as_ref()
            .ok_or_else(|| DbError::Connection("No database URL configured".to_string()))?;

        let mut pool_config = deadpool_postgres::Config::new();
        pool_config.url = Some(url.clone());
        pool_config.pool = Some(PoolConfig::new(config.max_connections));

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DbError::Connection(e.to_string()))?;

        info!(
            "Created PostgreSQL pool with up to {} connections",
            config.max_connections
        );

        Ok(Self { pool })
    }

    /// Use an existing pool
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    async fn client(&self) -> Result<deadpool_postgres::Object, DbError> {
        self.pool
            .get()
            .await
            .map_err(|e| DbError::Connection(e.to_string()))
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DbError> {
        debug!("Running query: {}", sql);

        let client = self.client().await?;
        let statement = client
            .prepare_cached(sql)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;

        if statement.params().len() != params.len() {
            return Err(DbError::Query(format!(
                "Statement expects {} parameters, got {}",
                statement.params().len(),
                params.len()
            )));
        }

        let bound = params
            .iter()
            .zip(statement.params())
            .map(|(value, ty)| to_sql_param(value, ty))
            .collect::<Result<Vec<_>, _>>()?;
        let refs: Vec<&(dyn ToSql + Sync)> = bound
            .iter()
            .map(|param| param.as_ref() as &(dyn ToSql + Sync))
            .collect();

        client
            .query(&statement, &refs)
            .await
            .map_err(|e| DbError::Query(e.to_string()))
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn query_get_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Record>, DbError> {
        self.query(sql, params)
            .await?
            .iter()
            .map(row_to_record)
            .collect()
    }

    async fn query_get_first_row(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<Record>, DbError> {
        self.query(sql, params)
            .await?
            .first()
            .map(row_to_record)
            .transpose()
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        debug!("Running batch: {}", sql);

        self.client()
            .await?
            .batch_execute(sql)
            .await
            .map_err(|e| DbError::Query(e.to_string()))
    }
}

fn optional<T>(
    value: &Value,
    ty: &Type,
    convert: impl FnOnce(&Value) -> Option<T>,
) -> Result<Option<T>, DbError> {
    if value.is_null() {
        return Ok(None);
    }
    convert(value)
        .map(Some)
        .ok_or_else(|| DbError::Conversion(format!("Cannot bind {} as {}", value, ty)))
}

/// Bind a JSON value with the Rust type PostgreSQL expects for `ty`
fn to_sql_param(value: &Value, ty: &Type) -> Result<Box<dyn ToSql + Sync + Send>, DbError> {
    let param: Box<dyn ToSql + Sync + Send> = match *ty {
        Type::BOOL => Box::new(optional(value, ty, Value::as_bool)?),
        Type::INT2 => Box::new(optional(value, ty, |v| {
            v.as_i64().and_then(|n| i16::try_from(n).ok())
        })?),
        Type::INT4 => Box::new(optional(value, ty, |v| {
            v.as_i64().and_then(|n| i32::try_from(n).ok())
        })?),
        Type::INT8 => Box::new(optional(value, ty, Value::as_i64)?),
        Type::FLOAT4 => Box::new(optional(value, ty, |v| v.as_f64().map(|n| n as f32))?),
        Type::FLOAT8 => Box::new(optional(value, ty, Value::as_f64)?),
        Type::JSON | Type::JSONB => Box::new(value.clone()),
        Type::UUID => Box::new(optional(value, ty, |v| {
            v.as_str().and_then(|s| Uuid::parse_str(s).ok())
        })?),
        Type::TIMESTAMPTZ => Box::new(optional(value, ty, |v| {
            v.as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|d| d.with_timezone(&Utc))
        })?),
        Type::TIMESTAMP => Box::new(optional(value, ty, |v| {
            v.as_str()
                .and_then(|s| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok())
        })?),
        Type::DATE => Box::new(optional(value, ty, |v| {
            v.as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        })?),
        _ => Box::new(optional(value, ty, |v| match v {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })?),
    };
    Ok(param)
}

fn row_to_record(row: &Row) -> Result<Record, DbError> {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        record.insert(
            column.name().to_string(),
            column_value(row, idx, column.type_())?,
        );
    }
    Ok(record)
}

fn column_value(row: &Row, idx: usize, ty: &Type) -> Result<Value, DbError> {
    let conversion = |e: tokio_postgres::Error| DbError::Conversion(e.to_string());

    let value = match *ty {
        Type::BOOL => row
            .try_get::<_, Option<bool>>(idx)
            .map_err(conversion)?
            .map(Value::from),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)
            .map_err(conversion)?
            .map(Value::from),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)
            .map_err(conversion)?
            .map(Value::from),
        Type::INT8 => row
            .try_get::<_, Option<i64>>(idx)
            .map_err(conversion)?
            .map(Value::from),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)
            .map_err(conversion)?
            .map(|n| Value::from(n as f64)),
        Type::FLOAT8 => row
            .try_get::<_, Option<f64>>(idx)
            .map_err(conversion)?
            .map(Value::from),
        Type::JSON | Type::JSONB => row.try_get::<_, Option<Value>>(idx).map_err(conversion)?,
        Type::UUID => row
            .try_get::<_, Option<Uuid>>(idx)
            .map_err(conversion)?
            .map(|u| Value::String(u.to_string())),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map_err(conversion)?
            .map(|d| Value::String(d.to_rfc3339())),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .map_err(conversion)?
            .map(|d| Value::String(d.format(TIMESTAMP_FORMAT).to_string())),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)
            .map_err(conversion)?
            .map(|d| Value::String(d.to_string())),
        _ => row
            .try_get::<_, Option<String>>(idx)
            .map_err(conversion)?
            .map(Value::String),
    };

    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_sql_param_accepts_matching_values() {
        assert!(to_sql_param(&json!(7), &Type::INT4).is_ok());
        assert!(to_sql_param(&json!(null), &Type::INT4).is_ok());
        assert!(to_sql_param(&json!("2024-01-02"), &Type::DATE).is_ok());
        assert!(to_sql_param(&json!("hello"), &Type::VARCHAR).is_ok());
        assert!(to_sql_param(&json!({"a": 1}), &Type::JSONB).is_ok());
    }

    #[test]
    fn test_to_sql_param_rejects_mismatches() {
        assert!(matches!(
            to_sql_param(&json!("seven"), &Type::INT4),
            Err(DbError::Conversion(_))
        ));
        assert!(matches!(
            to_sql_param(&json!(i64::MAX), &Type::INT4),
            Err(DbError::Conversion(_))
        ));
        assert!(matches!(
            to_sql_param(&json!("not-a-uuid"), &Type::UUID),
            Err(DbError::Conversion(_))
        ));
    }
}
