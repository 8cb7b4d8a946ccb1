use std::{
    error::Error as StdError,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use sqlfixture_core::{
    BEGIN_SQL, Backend, COMMIT_SQL, DatabaseAdapter, DatabaseUrl, ExecutionError, FailureKind,
    QueryRows, ROLLBACK_SQL, Result, Transaction,
};

pub const FAKE_DRIVER: &str = "fake";
pub const FAKE_URL: &str = "fake://scratch/test_fixtures";

#[derive(Debug)]
struct FailureRule {
    sql: String,
    kind: FailureKind,
    message: String,
}

#[derive(Debug, Default)]
struct FakeState {
    executed_sql: Vec<String>,
    failures: Vec<FailureRule>,
    connections_opened: usize,
    connections_closed: usize,
}

/// Records every statement across all connections it hands out.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

#[allow(dead_code)]
impl FakeBackend {
    pub fn fail_on(&self, sql: impl Into<String>, kind: FailureKind, message: impl Into<String>) {
        self.lock().failures.push(FailureRule {
            sql: sql.into(),
            kind,
            message: message.into(),
        });
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn clear_log(&self) {
        self.lock().executed_sql.clear();
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.lock().executed_sql.clone()
    }

    pub fn count(&self, sql: &str) -> usize {
        self.lock()
            .executed_sql
            .iter()
            .filter(|executed| executed.as_str() == sql)
            .count()
    }

    pub fn connections_opened(&self) -> usize {
        self.lock().connections_opened
    }

    pub fn connections_closed(&self) -> usize {
        self.lock().connections_closed
    }

    pub fn adapter(&self) -> FakeAdapter {
        self.lock().connections_opened += 1;
        FakeAdapter {
            state: Arc::clone(&self.state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state
            .lock()
            .unwrap_or_else(|error| panic!("fake backend state poisoned: {error}"))
    }
}

impl Backend for FakeBackend {
    fn name(&self) -> &'static str {
        FAKE_DRIVER
    }

    fn connect(&self, _url: &DatabaseUrl) -> Result<Box<dyn DatabaseAdapter>> {
        Ok(Box::new(self.adapter()))
    }

    fn truncate_table_sql(&self, table: &str) -> String {
        format!("DELETE FROM {table}")
    }
}

#[derive(Debug)]
pub struct FakeAdapter {
    state: Arc<Mutex<FakeState>>,
}

impl DatabaseAdapter for FakeAdapter {
    fn execute(&self, sql: &str) -> Result<u64> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|error| panic!("fake backend state poisoned: {error}"));

        if let Some(rule) = state.failures.iter().find(|rule| rule.sql == sql) {
            return Err(ExecutionError::statement_failed(
                sql,
                rule.kind,
                FakeSourceError(rule.message.clone()),
            )
            .into());
        }

        state.executed_sql.push(sql.to_string());
        Ok(1)
    }

    fn query(&self, sql: &str) -> Result<QueryRows> {
        self.execute(sql)?;
        Ok(QueryRows::default())
    }

    fn begin(&mut self) -> Result<Transaction<'_>> {
        self.execute(BEGIN_SQL)?;
        Ok(Transaction::new(&*self))
    }
}

impl Drop for FakeAdapter {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.connections_closed += 1;
        }
    }
}

#[allow(dead_code)]
pub fn transaction_markers(executed: &[String]) -> Vec<&str> {
    executed
        .iter()
        .map(String::as_str)
        .filter(|sql| matches!(*sql, BEGIN_SQL | COMMIT_SQL | ROLLBACK_SQL))
        .collect()
}

#[derive(Debug)]
struct FakeSourceError(String);

impl fmt::Display for FakeSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for FakeSourceError {}
