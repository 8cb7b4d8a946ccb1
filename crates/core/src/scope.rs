use tracing::{debug, info, warn};

use crate::{
    CleanupReport, Error, ExecutionError, FixtureEngine, LookupError, Result, TableDescriptor,
    lifecycle, locate, with_transaction,
};

/// A set of catalog tables loaded with fixture data for one test.
///
/// Fixture rows are inserted when the scope is created. [`Scope::clear`]
/// empties the tables again; [`Scope::run`] does so after the test body on
/// every exit path.
#[derive(Debug)]
pub struct Scope<'e> {
    engine: &'e FixtureEngine,
    tables: Vec<&'e TableDescriptor>,
}

impl<'e> Scope<'e> {
    pub(crate) fn new(engine: &'e FixtureEngine, tables: Vec<&'e TableDescriptor>) -> Result<Self> {
        let scope = Self { engine, tables };
        scope.insert_fixture_data()?;
        Ok(scope)
    }

    #[must_use]
    pub fn tables(&self) -> &[&'e TableDescriptor] {
        &self.tables
    }

    #[must_use]
    pub fn table_names(&self) -> Vec<&'e str> {
        self.tables.iter().map(|table| table.name()).collect()
    }

    /// Empties every selected table. Per-table failures are reported, not
    /// raised; only failing to connect is an error.
    pub fn clear(&self) -> Result<CleanupReport> {
        info!(tables = self.tables.len(), "clearing selected tables");
        let adapter = self.engine.connect()?;
        Ok(lifecycle::truncate_tables(
            self.engine.backend(),
            adapter.as_ref(),
            self.tables.iter().copied(),
        ))
    }

    /// Runs `body`, then clears the scope whether the body returns or panics.
    pub fn run<T>(&self, body: impl FnOnce() -> T) -> T {
        let _guard = ClearOnDrop { scope: self };
        body()
    }

    fn insert_fixture_data(&self) -> Result<()> {
        let registry = self.engine.registry();
        let data_dir = self.engine.config().fixture_data_dir();
        let mut adapter = self.engine.connect()?;

        with_transaction(adapter.as_mut(), |tx| {
            for table in &self.tables {
                let location = match locate(registry, data_dir, table) {
                    Ok(location) => location,
                    Err(Error::Lookup(LookupError::FixtureNotFound { .. })) => {
                        warn!(table = table.name(), "no fixture data found, skipping table");
                        continue;
                    }
                    Err(error) => return Err(error),
                };

                info!(
                    table = table.name(),
                    path = %location.path.display(),
                    format = %location.format,
                    "inserting fixture data"
                );
                let loader = registry.loader(location.format)?;
                let statement = loader.load(&location.path)?;
                if statement.trim().is_empty() {
                    continue;
                }

                let rows = tx.execute(&statement).map_err(|source| {
                    ExecutionError::FixtureInsert {
                        table: table.name().to_string(),
                        source: Box::new(source),
                    }
                })?;
                debug!(table = table.name(), rows, "fixture statement executed");
            }
            Ok(())
        })
    }
}

struct ClearOnDrop<'s, 'e> {
    scope: &'s Scope<'e>,
}

impl Drop for ClearOnDrop<'_, '_> {
    fn drop(&mut self) {
        match self.scope.clear() {
            Ok(report) if !report.is_clean() => {
                warn!(tables = ?report.failed_tables(), "scope cleanup left tables uncleared");
            }
            Ok(_) => {}
            Err(error) => warn!(%error, "scope cleanup failed"),
        }
    }
}
