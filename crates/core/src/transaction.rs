use tracing::warn;

use crate::{DatabaseAdapter, Result};

pub const BEGIN_SQL: &str = "BEGIN";
pub const COMMIT_SQL: &str = "COMMIT";
pub const ROLLBACK_SQL: &str = "ROLLBACK";

/// An open transaction. Rolls back on drop unless committed or rolled back
/// explicitly, so unwinding out of a transactional operation never leaves
/// partial work behind.
pub struct Transaction<'a> {
    adapter: &'a dyn DatabaseAdapter,
    open: bool,
}

impl<'a> Transaction<'a> {
    /// Wraps an adapter on which `BEGIN` has already been issued.
    #[must_use]
    pub fn new(adapter: &'a dyn DatabaseAdapter) -> Self {
        Self {
            adapter,
            open: true,
        }
    }

    pub fn execute(&mut self, sql: &str) -> Result<u64> {
        self.adapter.execute(sql)
    }

    pub fn commit(mut self) -> Result<()> {
        self.adapter.execute(COMMIT_SQL)?;
        self.open = false;
        Ok(())
    }

    pub fn rollback(mut self) -> Result<()> {
        self.open = false;
        self.adapter.execute(ROLLBACK_SQL).map(drop)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.open
            && let Err(error) = self.adapter.execute(ROLLBACK_SQL)
        {
            warn!(%error, "failed to roll back abandoned transaction");
        }
    }
}

/// Runs `operation` inside one transaction: commit on success, roll back and
/// return the error otherwise.
pub fn with_transaction<T>(
    adapter: &mut dyn DatabaseAdapter,
    operation: impl FnOnce(&mut Transaction<'_>) -> Result<T>,
) -> Result<T> {
    let mut tx = adapter.begin()?;
    match operation(&mut tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = tx.rollback() {
                warn!(error = %rollback_error, "rollback failed");
            }
            Err(error)
        }
    }
}
