use crate::{DatabaseUrl, Result, Transaction};

/// A fully materialized query result. `None` cells are SQL `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryRows {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }
}

/// One open connection. Dropping the adapter closes the connection.
pub trait DatabaseAdapter {
    /// Executes one or more statements and returns the affected row count.
    fn execute(&self, sql: &str) -> Result<u64>;
    fn query(&self, sql: &str) -> Result<QueryRows>;
    fn begin(&mut self) -> Result<Transaction<'_>>;
}

/// The relational target the engine runs against.
pub trait Backend: Send + Sync {
    /// Driver name, matched against the scheme of the configured database url.
    fn name(&self) -> &'static str;
    fn connect(&self, url: &DatabaseUrl) -> Result<Box<dyn DatabaseAdapter>>;

    fn truncate_table_sql(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {table}")
    }

    fn drop_table_sql(&self, table: &str) -> String {
        format!("DROP TABLE {table}")
    }
}
