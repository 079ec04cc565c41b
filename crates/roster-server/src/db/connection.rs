//! Connection interface used by the invoker
//!
//! The invoker only needs a handful of operations from a checked-out
//! connection, so they are spelled out as a trait instead of handing it a
//! driver type. [`PgConnectionSource`] is the production implementation; tests
//! substitute a scripted one.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPool, PgRow, PgTypeInfo, PgTypeKind, Postgres};
use sqlx::query::Query;
use sqlx::types::{BigDecimal, Uuid};
use sqlx::{Column, Row, Transaction, TypeInfo};
use std::collections::VecDeque;

use super::value::parse_numeric;
use super::{ProcedureError, SqlValue};

/// Hands out connections, one per invocation
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn ProcedureConnection>, ProcedureError>;
}

/// A checked-out connection with an open transaction
///
/// After [`execute`](Self::execute) the connection is positioned on the first
/// result-set, if any. Column metadata belongs to the current result-set and is
/// gone once [`next_result_set`](Self::next_result_set) moves on.
#[async_trait]
pub trait ProcedureConnection: Send {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<(), ProcedureError>;

    /// Column names of the current result-set, `None` when there is none
    fn columns(&self) -> Option<&[String]>;

    /// Drain the rows of the current result-set
    async fn fetch_all(&mut self) -> Result<Vec<Vec<SqlValue>>, ProcedureError>;

    /// Advance; returns `false` once every result-set has been visited
    async fn next_result_set(&mut self) -> Result<bool, ProcedureError>;

    async fn commit(&mut self) -> Result<(), ProcedureError>;

    /// Give the connection back. Work that was not committed is discarded.
    fn release(self: Box<Self>);
}

/// Pool-backed source: every acquisition begins a transaction
#[derive(Clone)]
pub struct PgConnectionSource {
    pool: PgPool,
}

impl PgConnectionSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionSource for PgConnectionSource {
    async fn acquire(&self) -> Result<Box<dyn ProcedureConnection>, ProcedureError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgProcedureConnection {
            tx: Some(tx),
            current: None,
            pending: VecDeque::new(),
        }))
    }
}

struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    fn from_rows(rows: &[PgRow]) -> Self {
        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let rows = rows
            .iter()
            .map(|row| (0..row.len()).map(|i| decode_column(row, i)).collect())
            .collect();
        Self { columns, rows }
    }
}

/// PostgreSQL connection holding one transaction
///
/// A function whose result columns are all `refcursor` is read as one
/// result-set per cursor, fetched in order inside the same transaction.
pub struct PgProcedureConnection {
    tx: Option<Transaction<'static, Postgres>>,
    current: Option<ResultSet>,
    pending: VecDeque<ResultSet>,
}

impl PgProcedureConnection {
    fn transaction(&mut self) -> Result<&mut Transaction<'static, Postgres>, ProcedureError> {
        self.tx
            .as_mut()
            .ok_or_else(|| ProcedureError::execution("transaction already committed"))
    }
}

#[async_trait]
impl ProcedureConnection for PgProcedureConnection {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<(), ProcedureError> {
        let tx = self.transaction()?;

        let mut query = sqlx::query(sql);
        for value in params {
            query = bind_value(query, value)?;
        }
        let rows = query.fetch_all(&mut **tx).await?;

        let mut sets = VecDeque::new();
        if let Some(cursors) = cursor_names(&rows)? {
            for cursor in cursors {
                let fetch = format!("FETCH ALL FROM {}", quote_ident(&cursor));
                let cursor_rows = sqlx::query(&fetch).fetch_all(&mut **tx).await?;
                sets.push_back(ResultSet::from_rows(&cursor_rows));
            }
        } else if !returns_void(&rows) {
            sets.push_back(ResultSet::from_rows(&rows));
        }

        self.current = sets.pop_front();
        self.pending = sets;
        Ok(())
    }

    fn columns(&self) -> Option<&[String]> {
        self.current.as_ref().map(|set| set.columns.as_slice())
    }

    async fn fetch_all(&mut self) -> Result<Vec<Vec<SqlValue>>, ProcedureError> {
        Ok(self
            .current
            .as_mut()
            .map(|set| std::mem::take(&mut set.rows))
            .unwrap_or_default())
    }

    async fn next_result_set(&mut self) -> Result<bool, ProcedureError> {
        self.current = self.pending.pop_front();
        Ok(self.current.is_some())
    }

    async fn commit(&mut self) -> Result<(), ProcedureError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| ProcedureError::execution("transaction already committed"))?;
        tx.commit().await?;
        Ok(())
    }

    fn release(self: Box<Self>) {
        if self.tx.is_some() {
            tracing::debug!("Releasing connection with an uncommitted transaction; rolling back");
        }
        // dropping the transaction queues its rollback and returns the
        // connection to the pool
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &SqlValue,
) -> Result<Query<'q, Postgres, PgArguments>, ProcedureError> {
    Ok(match value.clone() {
        SqlValue::Bool(v) => query.bind(v),
        SqlValue::Int(v) => query.bind(v),
        SqlValue::BigInt(v) => query.bind(v),
        SqlValue::Float(v) => query.bind(v),
        SqlValue::Numeric(v) => query.bind(v.as_deref().map(parse_numeric).transpose()?),
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Bytes(v) => query.bind(v),
        SqlValue::Date(v) => query.bind(v),
        SqlValue::Time(v) => query.bind(v),
        SqlValue::Timestamp(v) => query.bind(v),
        SqlValue::TimestampTz(v) => query.bind(v),
        SqlValue::Json(v) => query.bind(v),
    })
}

/// Compared case-insensitively: catalog-resolved types (`refcursor`, `xml`,
/// `citext`) carry lowercase names, built-in ones uppercase
const TEXT_WIRE_TYPES: &[&str] = &["TEXT", "VARCHAR", "BPCHAR", "NAME", "CITEXT", "XML", "REFCURSOR"];

/// Types whose binary wire form is their text form
fn is_text_on_the_wire(type_info: &PgTypeInfo) -> bool {
    let name = type_info.name();
    if TEXT_WIRE_TYPES.iter().any(|t| name.eq_ignore_ascii_case(t)) {
        return true;
    }
    match type_info.kind() {
        PgTypeKind::Enum(_) => true,
        PgTypeKind::Domain(base) => is_text_on_the_wire(base),
        _ => false,
    }
}

/// Cursor names when every column of the result is a `refcursor`
fn cursor_names(rows: &[PgRow]) -> Result<Option<Vec<String>>, ProcedureError> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };
    let all_cursors = !first.columns().is_empty()
        && first
            .columns()
            .iter()
            .all(|c| c.type_info().name().eq_ignore_ascii_case("refcursor"));
    if !all_cursors {
        return Ok(None);
    }

    let mut names = Vec::new();
    for row in rows {
        for index in 0..row.len() {
            // refcursor travels as its name; the String decoder reads it as text
            if let Some(name) = row.try_get_unchecked::<Option<String>, _>(index)? {
                names.push(name);
            }
        }
    }
    Ok(Some(names))
}

/// `SELECT * FROM f()` on a `void` function yields one row with one void column
fn returns_void(rows: &[PgRow]) -> bool {
    rows.first().is_some_and(|row| {
        row.columns()
            .iter()
            .all(|c| c.type_info().name() == "VOID")
    })
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn decode_column(row: &PgRow, index: usize) -> SqlValue {
    let type_info = row.column(index).type_info();
    let type_name = type_info.name().to_string();

    let decoded: Result<SqlValue, sqlx::Error> = match type_name.as_str() {
        "BOOL" => row.try_get(index).map(SqlValue::Bool),
        "INT2" => row
            .try_get::<Option<i16>, _>(index)
            .map(|v| SqlValue::Int(v.map(i32::from))),
        "INT4" => row.try_get(index).map(SqlValue::Int),
        "INT8" => row.try_get(index).map(SqlValue::BigInt),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)
            .map(|v| SqlValue::Float(v.map(f64::from))),
        "FLOAT8" => row.try_get(index).map(SqlValue::Float),
        "NUMERIC" => row
            .try_get::<Option<BigDecimal>, _>(index)
            .map(|v| SqlValue::Numeric(v.map(|d| d.to_string()))),
        "BYTEA" => row.try_get(index).map(SqlValue::Bytes),
        "DATE" => row.try_get(index).map(SqlValue::Date),
        "TIME" => row.try_get(index).map(SqlValue::Time),
        "TIMESTAMP" => row.try_get(index).map(SqlValue::Timestamp),
        "TIMESTAMPTZ" => row.try_get(index).map(SqlValue::TimestampTz),
        "JSON" | "JSONB" => row.try_get(index).map(SqlValue::Json),
        "UUID" => row
            .try_get::<Option<Uuid>, _>(index)
            .map(|v| SqlValue::Text(v.map(|u| u.to_string()))),
        _ if is_text_on_the_wire(type_info) => row
            .try_get_unchecked::<Option<String>, _>(index)
            .map(SqlValue::Text),
        _ => {
            tracing::warn!(
                column = row.column(index).name(),
                type_name = %type_name,
                "Unsupported column type; returning null"
            );
            return SqlValue::Text(None);
        },
    };

    decoded.unwrap_or_else(|e| {
        tracing::warn!(
            column = row.column(index).name(),
            type_name = %type_name,
            error = %e,
            "Column could not be decoded; returning null"
        );
        SqlValue::Text(None)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use sqlx::postgres::types::{PgInterval, PgMoney};
    use sqlx::Type;

    #[test]
    fn test_text_wire_types() {
        assert!(is_text_on_the_wire(&<String as Type<Postgres>>::type_info()));
        assert!(!is_text_on_the_wire(&<PgInterval as Type<Postgres>>::type_info()));
        assert!(!is_text_on_the_wire(&<PgMoney as Type<Postgres>>::type_info()));
        assert!(!is_text_on_the_wire(&<BigDecimal as Type<Postgres>>::type_info()));
    }

    #[test]
    fn test_malformed_numeric_parameter_is_rejected() {
        let bound = bind_value(
            sqlx::query::<Postgres>("SELECT $1"),
            &SqlValue::Numeric(Some("12,50".to_string())),
        );
        assert!(matches!(bound, Err(ProcedureError::InvalidCall(_))));

        let bound = bind_value(
            sqlx::query::<Postgres>("SELECT $1"),
            &SqlValue::Numeric(Some("12.50".to_string())),
        );
        assert!(bound.is_ok());
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("<unnamed portal 1>"), "\"<unnamed portal 1>\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
