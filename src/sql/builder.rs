//! Builds parameterized INSERT, SELECT, UPDATE, DELETE and EXISTS statements from ordered fields.

use crate::error::AppError;
use crate::value::{Fields, Scalar};

/// Identity column shared by every table.
pub const ID_COLUMN: &str = "id";

/// Tables the services may touch. Identifiers only ever come from here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    Devices,
    Properties,
    Rules,
    Conditions,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Devices => "devices",
            Table::Properties => "properties",
            Table::Rules => "rules",
            Table::Conditions => "conditions",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quote identifier for PostgreSQL (safe: only from code).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Scalar>,
}

impl QueryBuf {
    fn new() -> Self {
        Self::default()
    }

    fn push_param(&mut self, v: Scalar) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

fn reject_empty(table: Table, fields: &Fields) -> Result<(), AppError> {
    if fields.is_empty() {
        return Err(AppError::Validation(format!("no columns to write for {}", table)));
    }
    Ok(())
}

/// SELECT every row, ordered by identity so listings are stable.
pub fn select_all(table: Table) -> QueryBuf {
    QueryBuf {
        sql: format!("SELECT * FROM {} ORDER BY {}", quoted(table.as_str()), quoted(ID_COLUMN)),
        params: Vec::new(),
    }
}

/// SELECT one row by identity.
pub fn select_by_id(table: Table, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Scalar::from(id));
    q.sql = format!(
        "SELECT * FROM {} WHERE {} = ${}",
        quoted(table.as_str()),
        quoted(ID_COLUMN),
        n
    );
    q
}

/// INSERT: columns, placeholders and params are produced by one walk over `fields`,
/// so `$n` always lines up with the n-th bound value.
pub fn insert(table: Table, fields: &Fields) -> Result<QueryBuf, AppError> {
    reject_empty(table, fields)?;
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(fields.len());
    let mut placeholders = Vec::with_capacity(fields.len());
    for (col, val) in fields {
        let n = q.push_param(val.clone());
        cols.push(quoted(col));
        placeholders.push(format!("${}", n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(table.as_str()),
        cols.join(", "),
        placeholders.join(", "),
        quoted(ID_COLUMN)
    );
    Ok(q)
}

/// UPDATE by id: one `col = $n` per field except the identity, then the id as the last param.
pub fn update(table: Table, id: &str, fields: &Fields) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(fields.len());
    for (col, val) in fields {
        if *col == ID_COLUMN {
            continue;
        }
        let n = q.push_param(val.clone());
        sets.push(format!("{} = ${}", quoted(col), n));
    }
    if sets.is_empty() {
        return Err(AppError::Validation(format!("no columns to update for {}", table)));
    }
    let id_param = q.push_param(Scalar::from(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        quoted(table.as_str()),
        sets.join(", "),
        quoted(ID_COLUMN),
        id_param
    );
    Ok(q)
}

/// DELETE every row where `column` equals `value`.
pub fn delete_where(table: Table, column: &'static str, value: Scalar) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(value);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${}",
        quoted(table.as_str()),
        quoted(column),
        n
    );
    q
}

/// Existence check. The single result column is named `exists`.
pub fn exists_where(table: Table, column: &'static str, value: Scalar) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(value);
    q.sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE {} = ${}) AS \"exists\"",
        quoted(table.as_str()),
        quoted(column),
        n
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&'static str, &str)]) -> Fields {
        pairs.iter().map(|(c, v)| (*c, Scalar::from(*v))).collect()
    }

    #[test]
    fn insert_aligns_columns_placeholders_and_params() {
        let f = fields(&[("id", "r1"), ("name", "High Temp"), ("severity", "critical")]);
        let q = insert(Table::Rules, &f).unwrap();
        assert_eq!(
            q.sql,
            "INSERT INTO \"rules\" (\"id\", \"name\", \"severity\") \
             VALUES ($1, $2, $3) RETURNING \"id\""
        );
        assert_eq!(
            q.params,
            vec![Scalar::from("r1"), Scalar::from("High Temp"), Scalar::from("critical")]
        );
    }

    #[test]
    fn update_has_one_assignment_per_field_and_trailing_id() {
        let f = fields(&[("name", "x"), ("state", "Active")]);
        let q = update(Table::Devices, "d1", &f).unwrap();
        let (set_part, where_part) = q.sql.split_once(" WHERE ").unwrap();
        let set_part = set_part.strip_prefix("UPDATE \"devices\" SET ").unwrap();
        let assignments: Vec<&str> = set_part.split(", ").collect();
        assert_eq!(assignments, vec!["\"name\" = $1", "\"state\" = $2"]);
        assert_eq!(where_part, "\"id\" = $3");
        assert_eq!(
            q.params,
            vec![Scalar::from("x"), Scalar::from("Active"), Scalar::from("d1")]
        );
    }

    #[test]
    fn update_skips_identity_column() {
        let f = fields(&[("id", "other"), ("status", "Down")]);
        let q = update(Table::Devices, "d1", &f).unwrap();
        assert_eq!(q.sql, "UPDATE \"devices\" SET \"status\" = $1 WHERE \"id\" = $2");
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn empty_fields_are_rejected() {
        assert!(matches!(insert(Table::Rules, &Vec::new()), Err(AppError::Validation(_))));
        assert!(matches!(
            update(Table::Rules, "r1", &Vec::new()),
            Err(AppError::Validation(_))
        ));
        let only_id = fields(&[("id", "r2")]);
        assert!(matches!(update(Table::Rules, "r1", &only_id), Err(AppError::Validation(_))));
    }

    #[test]
    fn predicates_bind_a_single_value() {
        let q = delete_where(Table::Properties, "device_id", Scalar::from("d1"));
        assert_eq!(q.sql, "DELETE FROM \"properties\" WHERE \"device_id\" = $1");
        assert_eq!(q.params, vec![Scalar::from("d1")]);

        let q = exists_where(Table::Devices, "reference_id", Scalar::from("ref-'; DROP"));
        assert_eq!(
            q.sql,
            "SELECT EXISTS (SELECT 1 FROM \"devices\" WHERE \"reference_id\" = $1) AS \"exists\""
        );
        assert!(!q.sql.contains("DROP"));
    }

    #[test]
    fn selects() {
        assert_eq!(select_all(Table::Rules).sql, "SELECT * FROM \"rules\" ORDER BY \"id\"");
        let q = select_by_id(Table::Devices, "d1");
        assert_eq!(q.sql, "SELECT * FROM \"devices\" WHERE \"id\" = $1");
        assert_eq!(q.params, vec![Scalar::from("d1")]);
    }
}
