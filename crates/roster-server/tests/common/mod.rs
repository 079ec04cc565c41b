//! Shared helpers for Roster server integration tests
//!
//! - [`ScriptedSource`]: an in-memory [`ConnectionSource`] whose answers come
//!   from a closure, recording every statement, commit and release
//! - [`TestPostgres`]: a throwaway PostgreSQL container for the tests that
//!   need a real server
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{ScriptedSet, ScriptedSource};
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let source = ScriptedSource::new(|_sql, _params| {
//!         Ok(vec![ScriptedSet::new(&["status"], vec![vec!["SUCCESS".into()]])])
//!     });
//!     let result = source.invoker().query("SELECT 1", &[]).await.unwrap();
//!     assert_eq!(source.releases(), 1);
//! }
//! ```

#![allow(dead_code)]

use anyhow::{Context, Result};
use async_trait::async_trait;
use roster_server::db::{
    ConnectionSource, ProcedureConnection, ProcedureError, ProcedureInvoker, SqlValue,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use testcontainers::{
    core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt,
};
use testcontainers_modules::postgres::Postgres;
use tracing::info;

static TRACING: Once = Once::new();

/// Route test logs through the test writer; `RUST_LOG` overrides the filter
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("roster_server=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Scripted connection source
// ============================================================================

/// One result-set a scripted statement produces
#[derive(Debug, Clone, Default)]
pub struct ScriptedSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl ScriptedSet {
    pub fn new(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// A single `status`/`message` row
    pub fn status(status: &str, message: &str) -> Self {
        Self::new(&["status", "message"], vec![vec![status.into(), message.into()]])
    }
}

/// A statement as the connection received it
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedCall {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

type Responder = dyn Fn(&str, &[SqlValue]) -> Result<Vec<ScriptedSet>, ProcedureError> + Send + Sync;

#[derive(Debug, Default)]
struct Ledger {
    calls: Vec<ExecutedCall>,
    acquired: usize,
    commits: usize,
    releases: usize,
}

/// In-memory connection source driven by a responder closure
#[derive(Clone)]
pub struct ScriptedSource {
    responder: Arc<Responder>,
    ledger: Arc<Mutex<Ledger>>,
    fail_acquire: bool,
    fail_commit: bool,
}

impl ScriptedSource {
    pub fn new(
        responder: impl Fn(&str, &[SqlValue]) -> Result<Vec<ScriptedSet>, ProcedureError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            ledger: Arc::default(),
            fail_acquire: false,
            fail_commit: false,
        }
    }

    /// Every statement produces no result-set
    pub fn silent() -> Self {
        Self::new(|_, _| Ok(Vec::new()))
    }

    /// Acquisition always times out, like an exhausted pool
    pub fn unavailable() -> Self {
        Self {
            fail_acquire: true,
            ..Self::silent()
        }
    }

    /// Statements run but the commit fails
    pub fn with_failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    pub fn invoker(&self) -> ProcedureInvoker {
        ProcedureInvoker::new(Arc::new(self.clone()))
    }

    fn ledger(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn calls(&self) -> Vec<ExecutedCall> {
        self.ledger().calls.clone()
    }

    /// Statements whose text mentions `fragment`
    pub fn calls_to(&self, fragment: &str) -> Vec<ExecutedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.sql.contains(fragment))
            .collect()
    }

    pub fn acquired(&self) -> usize {
        self.ledger().acquired
    }

    pub fn commits(&self) -> usize {
        self.ledger().commits
    }

    pub fn releases(&self) -> usize {
        self.ledger().releases
    }
}

#[async_trait]
impl ConnectionSource for ScriptedSource {
    async fn acquire(&self) -> Result<Box<dyn ProcedureConnection>, ProcedureError> {
        if self.fail_acquire {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        self.ledger().acquired += 1;
        Ok(Box::new(ScriptedConnection {
            source: self.clone(),
            current: None,
            pending: VecDeque::new(),
        }))
    }
}

struct ScriptedConnection {
    source: ScriptedSource,
    current: Option<ScriptedSet>,
    pending: VecDeque<ScriptedSet>,
}

#[async_trait]
impl ProcedureConnection for ScriptedConnection {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<(), ProcedureError> {
        self.source.ledger().calls.push(ExecutedCall {
            sql: sql.to_string(),
            params: params.to_vec(),
        });

        let mut sets: VecDeque<ScriptedSet> = (self.source.responder)(sql, params)?.into();
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
        if self.source.fail_commit {
            return Err(ProcedureError::execution("commit refused"));
        }
        self.source.ledger().commits += 1;
        Ok(())
    }

    fn release(self: Box<Self>) {
        self.source.ledger().releases += 1;
    }
}

// ============================================================================
// PostgreSQL Test Container
// ============================================================================

/// Throwaway PostgreSQL server; the container stops when this is dropped
pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    pool: PgPool,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        info!("Starting PostgreSQL test container...");

        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        let url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Ok(Self {
            _container: container,
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run setup statements one at a time
    pub async fn execute_all(&self, statements: &[&str]) -> Result<()> {
        for statement in statements {
            sqlx::raw_sql(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Setup statement failed: {}", statement))?;
        }
        Ok(())
    }
}
