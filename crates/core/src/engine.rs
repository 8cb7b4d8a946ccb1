use std::{fmt, sync::Arc};

use tracing::info;

use crate::{
    Backend, CleanupReport, ConfigurationError, CreateOutcome, DatabaseAdapter, EngineConfig,
    FormatRegistry, LookupError, Result, Scope, TableDescriptor, lifecycle, parse_schema_file,
};

/// Owns the configuration and the table catalog parsed from the schema file.
pub struct FixtureEngine {
    config: EngineConfig,
    backend: Arc<dyn Backend>,
    registry: Arc<FormatRegistry>,
    tables: Vec<TableDescriptor>,
}

impl FixtureEngine {
    /// Validates `config`, parses the schema and creates (or truncates) every
    /// table, using the process-wide format registry.
    pub fn new(config: EngineConfig, backend: impl Backend + 'static) -> Result<Self> {
        Self::with_registry(config, Arc::new(backend), FormatRegistry::global())
    }

    pub fn with_registry(
        config: EngineConfig,
        backend: Arc<dyn Backend>,
        registry: Arc<FormatRegistry>,
    ) -> Result<Self> {
        config.validate(backend.name())?;

        let tables = parse_schema_file(config.schema_file_path())?;
        let engine = Self {
            config,
            backend,
            registry,
            tables,
        };
        engine.create_tables()?;

        Ok(engine)
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    #[must_use]
    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(TableDescriptor::name).collect()
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|table| table.name() == name)
    }

    /// Builds a scope over `names` and loads their fixture data.
    pub fn use_tables<S: AsRef<str>>(&self, names: &[S]) -> Result<Scope<'_>> {
        let selected = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.table(name).ok_or_else(|| LookupError::TableNotFound {
                    name: name.to_string(),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Scope::new(self, selected)
    }

    /// Creates every catalog table; existing tables are emptied instead.
    pub fn create_tables(&self) -> Result<Vec<CreateOutcome>> {
        let mut adapter = self.connect()?;
        lifecycle::create_tables(self.backend(), adapter.as_mut(), &self.tables)
    }

    /// Drops every catalog table, best-effort.
    pub fn drop_tables(&self) -> Result<CleanupReport> {
        info!(tables = self.tables.len(), "dropping fixture tables");
        let adapter = self.connect()?;
        Ok(lifecycle::drop_tables(
            self.backend(),
            adapter.as_ref(),
            &self.tables,
        ))
    }

    pub(crate) fn connect(&self) -> Result<Box<dyn DatabaseAdapter>> {
        let url = self
            .config
            .database_url()
            .ok_or(ConfigurationError::MissingDatabaseUrl)?;
        self.backend.connect(url)
    }
}

impl fmt::Display for FixtureEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.config.database_url() {
            Some(url) => write!(f, "FixtureEngine(url='{url}')"),
            None => f.write_str("FixtureEngine(url='')"),
        }
    }
}

impl fmt::Debug for FixtureEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureEngine")
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .field("tables", &self.table_names())
            .finish_non_exhaustive()
    }
}
