//! Store capability consumed by the repository, and its PostgreSQL implementation.

use crate::error::AppError;
use crate::value::{Record, Scalar};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPool, PgRow, Postgres};
use sqlx::query::Query;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;

/// Runs one parameterized statement. Implemented by the pool and by open transactions.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Rows in store order, columns named exactly as the store reports them.
    async fn fetch_all(&self, sql: &str, params: &[Scalar]) -> Result<Vec<Record>, AppError>;

    /// Rows affected.
    async fn execute(&self, sql: &str, params: &[Scalar]) -> Result<u64, AppError>;
}

/// An open transaction. Dropping it without `commit` rolls back.
#[async_trait]
pub trait UnitOfWork: QueryExecutor {
    async fn commit(self: Box<Self>) -> Result<(), AppError>;
    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}

#[async_trait]
pub trait Store: QueryExecutor {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError>;
}

/// Commit on success, roll back on failure. The original error wins over a failed rollback.
pub async fn finish<T>(
    tx: Box<dyn UnitOfWork>,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(v) => {
            tx.commit().await?;
            Ok(v)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub struct PgUnitOfWork {
    tx: Mutex<sqlx::Transaction<'static, Postgres>>,
    timeout: Duration,
}

async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(res) => res.map_err(AppError::from),
        Err(_) => Err(AppError::Query(format!(
            "store call exceeded {}ms",
            timeout.as_millis()
        ))),
    }
}

fn bind_all<'q>(sql: &'q str, params: &[Scalar]) -> Query<'q, Postgres, PgArguments> {
    let mut query = sqlx::query(sql);
    for p in params {
        query = query.bind(p.clone());
    }
    query
}

#[async_trait]
impl QueryExecutor for PgStore {
    async fn fetch_all(&self, sql: &str, params: &[Scalar]) -> Result<Vec<Record>, AppError> {
        tracing::debug!(sql = %sql, params = ?params, "query");
        let rows = bounded(self.timeout, bind_all(sql, params).fetch_all(&self.pool)).await?;
        rows.iter().map(row_to_record).collect()
    }

    async fn execute(&self, sql: &str, params: &[Scalar]) -> Result<u64, AppError> {
        tracing::debug!(sql = %sql, params = ?params, "execute");
        let done = bounded(self.timeout, bind_all(sql, params).execute(&self.pool)).await?;
        Ok(done.rows_affected())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let tx = bounded(self.timeout, self.pool.begin()).await?;
        Ok(Box::new(PgUnitOfWork {
            tx: Mutex::new(tx),
            timeout: self.timeout,
        }))
    }
}

#[async_trait]
impl QueryExecutor for PgUnitOfWork {
    async fn fetch_all(&self, sql: &str, params: &[Scalar]) -> Result<Vec<Record>, AppError> {
        tracing::debug!(sql = %sql, params = ?params, "query (tx)");
        let mut tx = self.tx.lock().await;
        let rows = bounded(self.timeout, bind_all(sql, params).fetch_all(&mut **tx)).await?;
        rows.iter().map(row_to_record).collect()
    }

    async fn execute(&self, sql: &str, params: &[Scalar]) -> Result<u64, AppError> {
        tracing::debug!(sql = %sql, params = ?params, "execute (tx)");
        let mut tx = self.tx.lock().await;
        let done = bounded(self.timeout, bind_all(sql, params).execute(&mut **tx)).await?;
        Ok(done.rows_affected())
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let this = *self;
        bounded(this.timeout, this.tx.into_inner().commit()).await
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        let this = *self;
        bounded(this.timeout, this.tx.into_inner().rollback()).await
    }
}

fn row_to_record(row: &PgRow) -> Result<Record, AppError> {
    use sqlx::{Column, Row};
    let mut record = Record::new();
    for (i, col) in row.columns().iter().enumerate() {
        record.push(col.name(), cell_to_scalar(row, i, col.name())?);
    }
    Ok(record)
}

/// Decode one cell by trying the types this schema can produce. Unknown types are an
/// error rather than a silent null.
fn cell_to_scalar(row: &PgRow, i: usize, name: &str) -> Result<Scalar, AppError> {
    use sqlx::{Row, ValueRef};
    let raw = row.try_get_raw(i)?;
    if raw.is_null() {
        return Ok(Scalar::Null);
    }
    if let Ok(s) = row.try_get::<String, _>(i) {
        return Ok(Scalar::Text(s));
    }
    if let Ok(b) = row.try_get::<bool, _>(i) {
        return Ok(Scalar::Bool(b));
    }
    if let Ok(n) = row.try_get::<i16, _>(i) {
        return Ok(Scalar::Int(n.into()));
    }
    if let Ok(n) = row.try_get::<i32, _>(i) {
        return Ok(Scalar::Int(n.into()));
    }
    if let Ok(n) = row.try_get::<i64, _>(i) {
        return Ok(Scalar::Int(n));
    }
    if let Ok(n) = row.try_get::<f32, _>(i) {
        return Ok(Scalar::Float(n.into()));
    }
    if let Ok(n) = row.try_get::<f64, _>(i) {
        return Ok(Scalar::Float(n));
    }
    if let Ok(u) = row.try_get::<uuid::Uuid, _>(i) {
        return Ok(Scalar::Text(u.to_string()));
    }
    if let Ok(d) = row.try_get::<chrono::DateTime<chrono::Utc>, _>(i) {
        return Ok(Scalar::Timestamp(d));
    }
    if let Ok(d) = row.try_get::<chrono::NaiveDateTime, _>(i) {
        return Ok(Scalar::Timestamp(d.and_utc()));
    }
    if let Ok(d) = row.try_get::<chrono::NaiveDate, _>(i) {
        return Ok(Scalar::Text(d.format("%Y-%m-%d").to_string()));
    }
    if let Ok(j) = row.try_get::<serde_json::Value, _>(i) {
        return Ok(Scalar::Text(j.to_string()));
    }
    if let Ok(b) = row.try_get::<Vec<u8>, _>(i) {
        return Ok(Scalar::Bytes(b));
    }
    Err(AppError::Query(format!(
        "column {} has unsupported type {}",
        name,
        raw.type_info()
    )))
}
