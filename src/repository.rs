//! Generic table access: runs builder statements through any `QueryExecutor` and hands
//! back ordered records. Errors are returned as-is; classification belongs to the services.

use crate::error::AppError;
use crate::sql::{
    delete_where, exists_where, insert, select_all, select_by_id, update, Table, ID_COLUMN,
};
use crate::store::QueryExecutor;
use crate::value::{Fields, Record, Scalar};

pub struct TableRepository;

impl TableRepository {
    /// Every row of `table`, one record per row.
    pub async fn get_all<E>(exec: &E, table: Table) -> Result<Vec<Record>, AppError>
    where
        E: QueryExecutor + ?Sized,
    {
        let q = select_all(table);
        exec.fetch_all(&q.sql, &q.params).await
    }

    /// Row by identity, if present.
    pub async fn get<E>(exec: &E, table: Table, id: &str) -> Result<Option<Record>, AppError>
    where
        E: QueryExecutor + ?Sized,
    {
        let q = select_by_id(table, id);
        let rows = exec.fetch_all(&q.sql, &q.params).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert with a freshly generated identity. Any caller-supplied `id` is replaced.
    /// Returns the identity the store reports back.
    pub async fn create<E>(exec: &E, table: Table, mut fields: Fields) -> Result<String, AppError>
    where
        E: QueryExecutor + ?Sized,
    {
        if fields.is_empty() {
            return Err(AppError::Validation(format!("no columns to write for {}", table)));
        }
        fields.retain(|(col, _)| *col != ID_COLUMN);
        let id = uuid::Uuid::new_v4().to_string();
        fields.insert(0, (ID_COLUMN, Scalar::Text(id)));
        let q = insert(table, &fields)?;
        let rows = exec.fetch_all(&q.sql, &q.params).await?;
        let row = rows
            .first()
            .ok_or_else(|| AppError::Query(format!("insert into {} returned no id", table)))?;
        row.text(ID_COLUMN)
    }

    /// Update by identity. Zero means no such row.
    pub async fn update<E>(
        exec: &E,
        table: Table,
        id: &str,
        fields: &Fields,
    ) -> Result<u64, AppError>
    where
        E: QueryExecutor + ?Sized,
    {
        let q = update(table, id, fields)?;
        exec.execute(&q.sql, &q.params).await
    }

    /// Delete every row where `column = value`. Deleting nothing is fine.
    pub async fn delete<E>(
        exec: &E,
        table: Table,
        column: &'static str,
        value: impl Into<Scalar>,
    ) -> Result<u64, AppError>
    where
        E: QueryExecutor + ?Sized,
    {
        let q = delete_where(table, column, value.into());
        exec.execute(&q.sql, &q.params).await
    }

    pub async fn check_exists<E>(
        exec: &E,
        table: Table,
        column: &'static str,
        value: impl Into<Scalar>,
    ) -> Result<bool, AppError>
    where
        E: QueryExecutor + ?Sized,
    {
        let q = exists_where(table, column, value.into());
        let rows = exec.fetch_all(&q.sql, &q.params).await?;
        match rows.first() {
            Some(row) => row.bool("exists"),
            None => Err(AppError::Query(format!("existence check on {} returned no row", table))),
        }
    }

    /// Read-only escape hatch for joins. Column names are whatever the statement aliases them to.
    pub async fn execute_query<E>(
        exec: &E,
        sql: &str,
        params: &[Scalar],
    ) -> Result<Vec<Record>, AppError>
    where
        E: QueryExecutor + ?Sized,
    {
        exec.fetch_all(sql, params).await
    }
}
