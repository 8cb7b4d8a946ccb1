//! SQLite backend: opens the database file named by `sqlite://<path>`.

mod adapter;

use sqlfixture_core::{Backend, DatabaseAdapter, DatabaseUrl, Result};

pub const SQLITE_DRIVER: &str = "sqlite";

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteBackend;

impl Backend for SqliteBackend {
    fn name(&self) -> &'static str {
        SQLITE_DRIVER
    }

    fn connect(&self, url: &DatabaseUrl) -> Result<Box<dyn DatabaseAdapter>> {
        adapter::connect(url)
    }

    // SQLite has no TRUNCATE; an unqualified DELETE takes the truncate
    // optimization path.
    fn truncate_table_sql(&self, table: &str) -> String {
        format!("DELETE FROM {table}")
    }
}
