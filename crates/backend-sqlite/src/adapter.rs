use std::{
    error::Error as StdError,
    io,
    sync::{Mutex, MutexGuard},
};

use rusqlite::{Connection, ErrorCode, types::ValueRef};
use sqlfixture_core::{
    BEGIN_SQL, DatabaseAdapter, DatabaseUrl, ExecutionError, FailureKind, QueryRows, Result,
    Transaction,
};
use tracing::debug;

const TOTAL_CHANGES_QUERY: &str = "SELECT total_changes()";
const POISONED_CONNECTION_MESSAGE: &str = "sqlite connection state was poisoned";
const ALREADY_EXISTS_MARKER: &str = "already exists";

pub(crate) struct SqliteAdapter {
    connection: Mutex<Connection>,
}

pub(crate) fn connect(url: &DatabaseUrl) -> Result<Box<dyn DatabaseAdapter>> {
    let connection = Connection::open(url.dsn())
        .map_err(|source| ExecutionError::connect(url.as_str(), source))?;
    debug!(
        path = url.dsn(),
        sqlite_version = rusqlite::version(),
        "opened sqlite connection"
    );

    Ok(Box::new(SqliteAdapter {
        connection: Mutex::new(connection),
    }))
}

impl SqliteAdapter {
    fn lock_connection(&self, sql: &str) -> Result<MutexGuard<'_, Connection>> {
        self.connection.lock().map_err(|_| {
            execution_error(
                sql,
                FailureKind::Other,
                io::Error::other(POISONED_CONNECTION_MESSAGE),
            )
        })
    }
}

impl DatabaseAdapter for SqliteAdapter {
    fn execute(&self, sql: &str) -> Result<u64> {
        let connection = self.lock_connection(sql)?;

        let before = total_changes(&connection)?;
        connection
            .execute_batch(sql)
            .map_err(|source| classified_error(sql, source))?;
        let rows = total_changes(&connection)?.saturating_sub(before);

        debug!(rows, sql, "sqlite statement executed");
        Ok(rows)
    }

    fn query(&self, sql: &str) -> Result<QueryRows> {
        let connection = self.lock_connection(sql)?;
        let mut statement = connection
            .prepare(sql)
            .map_err(|source| classified_error(sql, source))?;

        let columns: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut rows = statement
            .query([])
            .map_err(|source| classified_error(sql, source))?;
        let mut values = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|source| classified_error(sql, source))?
        {
            let mut cells = Vec::with_capacity(width);
            for index in 0..width {
                let value = row
                    .get_ref(index)
                    .map_err(|source| classified_error(sql, source))?;
                cells.push(render_value(value));
            }
            values.push(cells);
        }

        debug!(rows = values.len(), sql, "sqlite query returned");
        Ok(QueryRows {
            columns,
            rows: values,
        })
    }

    fn begin(&mut self) -> Result<Transaction<'_>> {
        self.execute(BEGIN_SQL)?;
        Ok(Transaction::new(&*self))
    }
}

fn total_changes(connection: &Connection) -> Result<u64> {
    connection
        .query_row(TOTAL_CHANGES_QUERY, [], |row| row.get::<_, i64>(0))
        .map(|changes| u64::try_from(changes).unwrap_or_default())
        .map_err(|source| classified_error(TOTAL_CHANGES_QUERY, source))
}

fn render_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(value) => Some(value.to_string()),
        ValueRef::Real(value) => Some(value.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// `CREATE TABLE` on an existing table fails with the generic `SQLITE_ERROR`
/// code; only the message tells it apart from other errors.
fn failure_kind(error: &rusqlite::Error) -> FailureKind {
    match error {
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.code == ErrorCode::Unknown && message.contains(ALREADY_EXISTS_MARKER) =>
        {
            FailureKind::AlreadyExists
        }
        _ => FailureKind::Other,
    }
}

fn classified_error(sql: &str, source: rusqlite::Error) -> sqlfixture_core::Error {
    let kind = failure_kind(&source);
    execution_error(sql, kind, source)
}

fn execution_error<E>(sql: &str, kind: FailureKind, source: E) -> sqlfixture_core::Error
where
    E: StdError + Send + Sync + 'static,
{
    ExecutionError::statement_failed(sql, kind, source).into()
}
