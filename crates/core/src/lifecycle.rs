use tracing::{debug, info, warn};

use crate::{
    Backend, DatabaseAdapter, Error, Result, TableDescriptor, Transaction, with_transaction,
};

/// What `create_tables` did with one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// The table (possibly pre-existing) had its rows removed.
    Truncated,
    Failed,
}

#[derive(Debug)]
pub struct CleanupFailure {
    pub table: String,
    pub error: Error,
}

/// Per-table failures of a best-effort truncate or drop pass.
#[derive(Debug, Default)]
pub struct CleanupReport {
    failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn failures(&self) -> &[CleanupFailure] {
        &self.failures
    }

    #[must_use]
    pub fn failed_tables(&self) -> Vec<&str> {
        self.failures
            .iter()
            .map(|failure| failure.table.as_str())
            .collect()
    }
}

/// Creates every table inside one transaction. Tables that already exist are
/// truncated; other per-table failures are logged and skipped.
pub fn create_tables(
    backend: &dyn Backend,
    adapter: &mut dyn DatabaseAdapter,
    tables: &[TableDescriptor],
) -> Result<Vec<CreateOutcome>> {
    info!(tables = tables.len(), "creating fixture tables");

    with_transaction(adapter, |tx| {
        Ok(tables
            .iter()
            .map(|table| ensure_created(backend, tx, table))
            .collect())
    })
}

fn ensure_created(
    backend: &dyn Backend,
    tx: &mut Transaction<'_>,
    table: &TableDescriptor,
) -> CreateOutcome {
    match tx.execute(table.create_statement()) {
        // IF NOT EXISTS never reports an existing table, so clear it anyway.
        Ok(_) if table.if_not_exists() => clear_existing(backend, tx, table),
        Ok(_) => {
            debug!(table = table.name(), "table created");
            CreateOutcome::Created
        }
        Err(error) if error.is_already_exists() => {
            info!(
                table = table.name(),
                "table already exists, clearing existing rows"
            );
            clear_existing(backend, tx, table)
        }
        Err(error) => {
            warn!(table = table.name(), %error, "failed to create table");
            CreateOutcome::Failed
        }
    }
}

fn clear_existing(
    backend: &dyn Backend,
    tx: &mut Transaction<'_>,
    table: &TableDescriptor,
) -> CreateOutcome {
    match tx.execute(&backend.truncate_table_sql(table.name())) {
        Ok(_) => CreateOutcome::Truncated,
        Err(error) => {
            warn!(table = table.name(), %error, "failed to clear existing table");
            CreateOutcome::Failed
        }
    }
}

pub fn truncate_tables<'t>(
    backend: &dyn Backend,
    adapter: &dyn DatabaseAdapter,
    tables: impl IntoIterator<Item = &'t TableDescriptor>,
) -> CleanupReport {
    run_best_effort(adapter, tables, "clear", |name| {
        backend.truncate_table_sql(name)
    })
}

pub fn drop_tables<'t>(
    backend: &dyn Backend,
    adapter: &dyn DatabaseAdapter,
    tables: impl IntoIterator<Item = &'t TableDescriptor>,
) -> CleanupReport {
    run_best_effort(adapter, tables, "drop", |name| backend.drop_table_sql(name))
}

fn run_best_effort<'t>(
    adapter: &dyn DatabaseAdapter,
    tables: impl IntoIterator<Item = &'t TableDescriptor>,
    action: &'static str,
    statement: impl Fn(&str) -> String,
) -> CleanupReport {
    let mut report = CleanupReport::default();

    for table in tables {
        if let Err(error) = adapter.execute(&statement(table.name())) {
            warn!(table = table.name(), action, %error, "best-effort table operation failed");
            report.failures.push(CleanupFailure {
                table: table.name().to_string(),
                error,
            });
        }
    }

    report
}
