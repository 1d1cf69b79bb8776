//! Scripted store for tests: records every statement and replays queued replies in order.

use crate::error::AppError;
use crate::store::{QueryExecutor, Store, UnitOfWork};
use crate::value::{Record, Scalar};
use async_trait::async_trait;
use sqlx::error::{DatabaseError, ErrorKind};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug)]
pub enum Reply {
    Rows(Vec<Record>),
    Affected(u64),
    Fail(String),
    /// The database error Postgres raises for a duplicate key.
    UniqueViolation,
}

impl Reply {
    pub fn rows(rows: Vec<Record>) -> Self {
        Reply::Rows(rows)
    }

    pub fn exists(b: bool) -> Self {
        Reply::Rows(vec![Record::new().with("exists", b)])
    }

    pub fn id(id: &str) -> Self {
        Reply::Rows(vec![Record::new().with("id", id)])
    }
}

/// SQLSTATE 23505 as the driver reports it.
#[derive(Debug)]
pub struct UniqueViolation;

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("duplicate key value violates unique constraint")
    }
}

impl StdError for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed("23505"))
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

pub fn unique_violation() -> AppError {
    AppError::Db(sqlx::Error::Database(Box::new(UniqueViolation)))
}

#[derive(Clone, Debug)]
pub struct Call {
    pub sql: String,
    pub params: Vec<Scalar>,
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    calls: Vec<Call>,
}

#[derive(Clone, Default)]
pub struct ScriptedStore {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Reply) {
        self.inner.lock().unwrap().replies.push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Statement text only, including BEGIN/COMMIT/ROLLBACK markers.
    pub fn statements(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.sql).collect()
    }

    pub fn remaining(&self) -> usize {
        self.inner.lock().unwrap().replies.len()
    }

    fn mark(&self, sql: &str) {
        self.inner.lock().unwrap().calls.push(Call {
            sql: sql.to_string(),
            params: Vec::new(),
        });
    }

    fn next(&self, sql: &str, params: &[Scalar]) -> Reply {
        let mut script = self.inner.lock().unwrap();
        script.calls.push(Call {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        script
            .replies
            .pop_front()
            .unwrap_or_else(|| panic!("no reply scripted for: {}", sql))
    }
}

#[async_trait]
impl QueryExecutor for ScriptedStore {
    async fn fetch_all(&self, sql: &str, params: &[Scalar]) -> Result<Vec<Record>, AppError> {
        match self.next(sql, params) {
            Reply::Rows(rows) => Ok(rows),
            Reply::Fail(msg) => Err(AppError::Query(msg)),
            Reply::UniqueViolation => Err(unique_violation()),
            Reply::Affected(_) => panic!("expected rows for: {}", sql),
        }
    }

    async fn execute(&self, sql: &str, params: &[Scalar]) -> Result<u64, AppError> {
        match self.next(sql, params) {
            Reply::Affected(n) => Ok(n),
            Reply::Fail(msg) => Err(AppError::Query(msg)),
            Reply::UniqueViolation => Err(unique_violation()),
            Reply::Rows(_) => panic!("expected affected count for: {}", sql),
        }
    }
}

#[async_trait]
impl Store for ScriptedStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        self.mark("BEGIN");
        Ok(Box::new(ScriptedTx(self.clone())))
    }
}

struct ScriptedTx(ScriptedStore);

#[async_trait]
impl QueryExecutor for ScriptedTx {
    async fn fetch_all(&self, sql: &str, params: &[Scalar]) -> Result<Vec<Record>, AppError> {
        self.0.fetch_all(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[Scalar]) -> Result<u64, AppError> {
        self.0.execute(sql, params).await
    }
}

#[async_trait]
impl UnitOfWork for ScriptedTx {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.0.mark("COMMIT");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.0.mark("ROLLBACK");
        Ok(())
    }
}
