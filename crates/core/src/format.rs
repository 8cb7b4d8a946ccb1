mod document;
mod exporters;
mod loaders;

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::Path,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

pub use document::{FixtureDocument, FixtureValue};
pub use exporters::{JsonExporter, SqlExporter, YamlExporter};
pub use loaders::{JsonLoader, SqlLoader, YamlLoader, render_insert};

use crate::{ConfigurationError, ExportError, LoadError, LookupError};

/// Identifies a fixture encoding. Built-in formats are associated constants;
/// additional formats are created with [`DataFormat::custom`] and registered
/// on a [`FormatRegistry`]. Custom ids live in their own namespace and never
/// compare equal to a built-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataFormat(FormatId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum FormatId {
    Sql,
    Yaml,
    Json,
    Custom(u16),
}

impl DataFormat {
    pub const SQL: Self = Self(FormatId::Sql);
    pub const YAML: Self = Self(FormatId::Yaml);
    pub const JSON: Self = Self(FormatId::Json);

    #[must_use]
    pub const fn custom(id: u16) -> Self {
        Self(FormatId::Custom(id))
    }

    /// The id passed to [`DataFormat::custom`]; `None` for built-ins.
    #[must_use]
    pub const fn custom_id(self) -> Option<u16> {
        match self.0 {
            FormatId::Custom(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            FormatId::Sql => f.write_str("sql"),
            FormatId::Yaml => f.write_str("yaml"),
            FormatId::Json => f.write_str("json"),
            FormatId::Custom(id) => write!(f, "format#{id}"),
        }
    }
}

/// Turns a fixture file into a ready-to-execute insert statement. Must not
/// touch the database. An empty statement means there is nothing to insert.
pub trait Loader: Send + Sync {
    fn load(&self, path: &Path) -> Result<String, LoadError>;
}

/// Serializes a query result into fixture file content.
pub trait Exporter: Send + Sync {
    fn export(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Option<String>>],
    ) -> Result<Vec<u8>, ExportError>;
}

#[derive(Default)]
struct RegistryState {
    extensions: BTreeMap<String, DataFormat>,
    loaders: HashMap<DataFormat, Arc<dyn Loader>>,
    exporters: HashMap<DataFormat, Arc<dyn Exporter>>,
}

impl RegistryState {
    fn bind_extension(
        &mut self,
        format: DataFormat,
        extension: &str,
    ) -> Result<(), ConfigurationError> {
        let extension = normalize_extension(extension);
        match self.extensions.get(&extension) {
            Some(existing) if *existing != format => Err(ConfigurationError::ExtensionConflict {
                extension,
                existing: *existing,
                requested: format,
            }),
            Some(_) => Ok(()),
            None => {
                self.extensions.insert(extension, format);
                Ok(())
            }
        }
    }
}

/// Extension ↔ format mapping plus per-format loaders and exporters.
#[derive(Default)]
pub struct FormatRegistry {
    state: RwLock<RegistryState>,
}

static GLOBAL_REGISTRY: OnceLock<Arc<FormatRegistry>> = OnceLock::new();

impl FormatRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_builtin_formats() -> Self {
        let registry = Self::new();
        {
            let mut state = registry.write_state();
            for (format, extension, loader, exporter) in builtin_formats() {
                state.extensions.insert(extension.to_string(), format);
                state.loaders.insert(format, loader);
                state.exporters.insert(format, exporter);
            }
        }
        registry
    }

    /// The process-wide registry, with the built-in formats installed on
    /// first access.
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(Self::with_builtin_formats())))
    }

    pub fn register_builtin_formats(&self) -> Result<(), ConfigurationError> {
        for (format, extension, loader, exporter) in builtin_formats() {
            self.register(format, extension, loader, exporter)?;
        }
        Ok(())
    }

    pub fn register(
        &self,
        format: DataFormat,
        extension: &str,
        loader: Arc<dyn Loader>,
        exporter: Arc<dyn Exporter>,
    ) -> Result<(), ConfigurationError> {
        let mut state = self.write_state();
        state.bind_extension(format, extension)?;
        state.loaders.insert(format, loader);
        state.exporters.insert(format, exporter);
        Ok(())
    }

    pub fn register_loader(
        &self,
        format: DataFormat,
        extension: &str,
        loader: Arc<dyn Loader>,
    ) -> Result<(), ConfigurationError> {
        let mut state = self.write_state();
        state.bind_extension(format, extension)?;
        state.loaders.insert(format, loader);
        Ok(())
    }

    pub fn register_exporter(
        &self,
        format: DataFormat,
        extension: &str,
        exporter: Arc<dyn Exporter>,
    ) -> Result<(), ConfigurationError> {
        let mut state = self.write_state();
        state.bind_extension(format, extension)?;
        state.exporters.insert(format, exporter);
        Ok(())
    }

    pub fn loader(&self, format: DataFormat) -> Result<Arc<dyn Loader>, LookupError> {
        self.read_state()
            .loaders
            .get(&format)
            .cloned()
            .ok_or(LookupError::LoaderNotFound { format })
    }

    pub fn exporter(&self, format: DataFormat) -> Result<Arc<dyn Exporter>, LookupError> {
        self.read_state()
            .exporters
            .get(&format)
            .cloned()
            .ok_or(LookupError::ExporterNotFound { format })
    }

    #[must_use]
    pub fn format_by_extension(&self, extension: &str) -> Option<DataFormat> {
        self.read_state()
            .extensions
            .get(&normalize_extension(extension))
            .copied()
    }

    /// Registered extensions with their formats, sorted by extension.
    #[must_use]
    pub fn extensions(&self) -> Vec<(String, DataFormat)> {
        self.read_state()
            .extensions
            .iter()
            .map(|(extension, format)| (extension.clone(), *format))
            .collect()
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("extensions", &self.read_state().extensions)
            .finish_non_exhaustive()
    }
}

type Registration = (DataFormat, &'static str, Arc<dyn Loader>, Arc<dyn Exporter>);

fn builtin_formats() -> [Registration; 3] {
    [
        (
            DataFormat::SQL,
            ".sql",
            Arc::new(SqlLoader),
            Arc::new(SqlExporter),
        ),
        (
            DataFormat::YAML,
            ".yml",
            Arc::new(YamlLoader),
            Arc::new(YamlExporter),
        ),
        (
            DataFormat::JSON,
            ".json",
            Arc::new(JsonLoader),
            Arc::new(JsonExporter),
        ),
    ]
}

fn normalize_extension(extension: &str) -> String {
    let extension = extension.trim();
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}
