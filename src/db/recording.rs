//! Recording database handle
//!
//! Executes nothing. Every statement is recorded with its parameters, and row
//! queries are answered from canned responses matched by SQL fragment. Useful
//! for dry runs (collecting the DDL a provisioning run would issue) and tests.

use super::{Database, DbError, Record};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};

/// Which handle operation issued a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Rows,
    FirstRow,
    Batch,
}

/// A statement seen by the recording handle
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub kind: QueryKind,
    pub sql: String,
    pub params: Vec<Value>,
}

enum Response {
    Rows(Vec<Record>),
    Failure(DbError),
}

/// Database handle that records statements instead of running them
#[derive(Default)]
pub struct RecordingDatabase {
    queries: Mutex<Vec<RecordedQuery>>,
    responses: Vec<(String, Response)>,
}

impl RecordingDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer statements containing `sql_fragment` with `rows`.
    ///
    /// Responses are matched in registration order; unmatched statements yield no rows.
    pub fn respond_with(mut self, sql_fragment: impl Into<String>, rows: Vec<Record>) -> Self {
        self.responses
            .push((sql_fragment.into(), Response::Rows(rows)));
        self
    }

    /// Fail statements containing `sql_fragment` with `error`
    pub fn fail_with(mut self, sql_fragment: impl Into<String>, error: DbError) -> Self {
        self.responses
            .push((sql_fragment.into(), Response::Failure(error)));
        self
    }

    /// All statements recorded so far, in issue order
    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.lock().clone()
    }

    /// Forget the recorded statements
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedQuery>> {
        // A panic while holding the lock cannot leave the log half-written
        self.queries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, kind: QueryKind, sql: &str, params: &[Value]) -> Result<Vec<Record>, DbError> {
        self.lock().push(RecordedQuery {
            kind,
            sql: sql.to_string(),
            params: params.to_vec(),
        });

        match self
            .responses
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
        {
            Some((_, Response::Rows(rows))) => Ok(rows.clone()),
            Some((_, Response::Failure(error))) => Err(error.clone()),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl Database for RecordingDatabase {
    async fn query_get_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Record>, DbError> {
        self.record(QueryKind::Rows, sql, params)
    }

    async fn query_get_first_row(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<Record>, DbError> {
        Ok(self
            .record(QueryKind::FirstRow, sql, params)?
            .into_iter()
            .next())
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        self.record(QueryKind::Batch, sql, &[]).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_records_queries_and_answers() {
        let db = RecordingDatabase::new()
            .respond_with("FROM public.recipe", vec![record(json!({"id": 1})), record(json!({"id": 2}))]);

        let rows = db
            .query_get_rows("SELECT r.id FROM public.recipe r", &[json!(7)])
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let first = db
            .query_get_first_row("SELECT r.id FROM public.recipe r", &[json!(7)])
            .await
            .unwrap();
        assert_eq!(first, Some(record(json!({"id": 1}))));

        let none = db
            .query_get_first_row("SELECT r.id FROM public.user r", &[])
            .await
            .unwrap();
        assert!(none.is_none());

        let queries = db.queries();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0].kind, QueryKind::Rows);
        assert_eq!(queries[0].params, vec![json!(7)]);
        assert_eq!(queries[1].kind, QueryKind::FirstRow);
    }

    #[tokio::test]
    async fn test_failure_response() {
        let db = RecordingDatabase::new()
            .fail_with("drop table", DbError::Query("permission denied".to_string()));

        let result = db.execute_batch("drop table if exists public.user;").await;
        assert_eq!(result, Err(DbError::Query("permission denied".to_string())));

        db.clear();
        assert!(db.queries().is_empty());
    }
}
