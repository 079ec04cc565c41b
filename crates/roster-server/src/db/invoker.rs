//! Procedure invoker
//!
//! Runs one [`ProcedureCall`] on its own connection:
//!
//! 1. acquire a connection
//! 2. execute the call text with the parameters in order
//! 3. for each result-set, read its columns and serialize its rows before
//!    advancing (column metadata does not survive the advance)
//! 4. commit, whether or not rows came back
//! 5. release, on every path
//!
//! A failure at any step is returned as-is after the release; nothing is
//! retried and nothing is committed.

use serde_json::Value;
use std::sync::Arc;

use super::{
    serialize_row, ConnectionSource, ProcedureCall, ProcedureConnection, ProcedureError, Record,
    SqlValue,
};

/// Status reported by the synthetic record of a call that returned no rows
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Status procedures put in their own row to signal a business-rule failure
pub const STATUS_ERROR: &str = "ERROR";

/// Serialized output of one call, result-sets in the order they were produced
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureResult {
    sets: Vec<Vec<Record>>,
    produced_rows: bool,
}

impl ProcedureResult {
    /// Wrap collected result-sets. When no set holds a single row the result
    /// is the one synthetic record `{"status": "SUCCESS"}`.
    pub fn from_sets(sets: Vec<Vec<Record>>) -> Self {
        if sets.iter().any(|set| !set.is_empty()) {
            return Self {
                sets,
                produced_rows: true,
            };
        }

        let mut record = Record::new();
        record.insert("status".to_string(), Value::from(STATUS_SUCCESS));
        Self {
            sets: vec![vec![record]],
            produced_rows: false,
        }
    }

    /// False when the records are the synthetic success record
    pub fn produced_rows(&self) -> bool {
        self.produced_rows
    }

    /// Records of the first result-set
    pub fn rows(&self) -> &[Record] {
        self.result_set(0)
    }

    pub fn first(&self) -> Option<&Record> {
        self.rows().first()
    }

    /// Records of the `index`-th result-set; empty when absent
    pub fn result_set(&self, index: usize) -> &[Record] {
        self.sets.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `status` column of the first record, if the procedure reported one
    pub fn status(&self) -> Option<&str> {
        self.first()
            .and_then(|record| record.get("status"))
            .and_then(Value::as_str)
    }

    pub fn is_rejection(&self) -> bool {
        self.status()
            .is_some_and(|s| s.eq_ignore_ascii_case(STATUS_ERROR))
    }

    /// The first real row, or [`ProcedureError::NotFound`] naming `what`
    pub fn single(self, what: &str) -> Result<Record, ProcedureError> {
        if !self.produced_rows {
            return Err(ProcedureError::not_found(what));
        }
        self.into_rows()
            .into_iter()
            .next()
            .ok_or_else(|| ProcedureError::not_found(what))
    }

    /// Records of the first result-set, by value
    pub fn into_rows(self) -> Vec<Record> {
        self.sets.into_iter().next().unwrap_or_default()
    }

    /// Records of the first result-set, empty instead of the synthetic record
    pub fn into_data_rows(self) -> Vec<Record> {
        if self.produced_rows {
            self.into_rows()
        } else {
            Vec::new()
        }
    }
}

/// Executes stored procedures against a [`ConnectionSource`]
#[derive(Clone)]
pub struct ProcedureInvoker {
    source: Arc<dyn ConnectionSource>,
}

impl ProcedureInvoker {
    pub fn new(source: Arc<dyn ConnectionSource>) -> Self {
        Self { source }
    }

    /// Run a stored procedure and commit
    #[tracing::instrument(skip(self, call), fields(procedure = %call.name(), params = call.arity()))]
    pub async fn invoke(&self, call: &ProcedureCall) -> Result<ProcedureResult, ProcedureError> {
        call.validate()?;
        self.run(&call.to_sql(), &call.values()).await
    }

    /// Run a plain SQL statement through the same acquire/commit/release path
    #[tracing::instrument(skip(self, sql, params), fields(params = params.len()))]
    pub async fn query(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<ProcedureResult, ProcedureError> {
        self.run(sql, params).await
    }

    async fn run(&self, sql: &str, params: &[SqlValue]) -> Result<ProcedureResult, ProcedureError> {
        let mut conn = self.source.acquire().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to acquire database connection");
            e
        })?;

        let outcome = collect(conn.as_mut(), sql, params).await;
        conn.release();

        match outcome {
            Ok(sets) => {
                tracing::debug!(result_sets = sets.len(), "Procedure completed");
                Ok(ProcedureResult::from_sets(sets))
            },
            Err(e) => {
                tracing::error!(error = %e, "Procedure failed");
                Err(e)
            },
        }
    }
}

async fn collect(
    conn: &mut dyn ProcedureConnection,
    sql: &str,
    params: &[SqlValue],
) -> Result<Vec<Vec<Record>>, ProcedureError> {
    conn.execute(sql, params).await?;

    let mut sets = Vec::new();
    loop {
        if let Some(columns) = conn.columns().map(<[String]>::to_vec) {
            let rows = conn.fetch_all().await?;
            sets.push(rows.iter().map(|row| serialize_row(&columns, row)).collect());
        }
        if !conn.next_result_set().await? {
            break;
        }
    }

    conn.commit().await?;
    Ok(sets)
}
