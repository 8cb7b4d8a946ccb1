use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::ConfigurationError;

pub const DEFAULT_FIXTURE_DATA_DIR: &str = ".";
pub const DEFAULT_SCHEMA_FILE_NAME: &str = "schema.sql";
pub const TEST_DATABASE_PREFIX: &str = "test_";

pub const DATABASE_URL_ENV: &str = "FIXTURE_DATABASE_URL";
pub const DATA_DIR_ENV: &str = "FIXTURE_DATA_DIR";
pub const SCHEMA_FILE_ENV: &str = "FIXTURE_SCHEMA_FILE";

/// A database target in `<driver>://<dsn>` (or `<driver>:<dsn>`) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseUrl {
    raw: String,
    driver: String,
    dsn: String,
}

impl DatabaseUrl {
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let invalid = || ConfigurationError::InvalidDatabaseUrl {
            raw: raw.to_string(),
        };

        let (driver, dsn) = match raw.split_once("://") {
            Some(parts) => parts,
            None => raw.split_once(':').ok_or_else(invalid)?,
        };

        let valid_driver = !driver.is_empty()
            && driver
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '+' || ch == '-' || ch == '_');
        if !valid_driver || dsn.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            raw: raw.to_string(),
            driver: driver.to_ascii_lowercase(),
            dsn: dsn.to_string(),
        })
    }

    #[must_use]
    pub fn driver(&self) -> &str {
        &self.driver
    }

    #[must_use]
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The database name: last path segment of the dsn without query string
    /// or file extension. Empty when the dsn carries no name.
    #[must_use]
    pub fn db_name(&self) -> &str {
        let without_query = self.dsn.split('?').next().unwrap_or_default();
        let segment = without_query.rsplit('/').next().unwrap_or_default();
        match segment.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => segment,
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    database_url: Option<DatabaseUrl>,
    fixture_data_dir: PathBuf,
    schema_file_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            fixture_data_dir: PathBuf::from(DEFAULT_FIXTURE_DATA_DIR),
            schema_file_path: Path::new(DEFAULT_FIXTURE_DATA_DIR).join(DEFAULT_SCHEMA_FILE_NAME),
        }
    }
}

impl EngineConfig {
    /// Sets the scratch database. Only databases named `test_*` are accepted.
    pub fn database(mut self, raw: &str) -> Result<Self, ConfigurationError> {
        let url = DatabaseUrl::parse(raw)?;

        let name = url.db_name();
        if name.is_empty() {
            return Err(ConfigurationError::MissingDatabaseName {
                raw: raw.to_string(),
            });
        }
        if !name.starts_with(TEST_DATABASE_PREFIX) {
            return Err(ConfigurationError::NotATestDatabase {
                name: name.to_string(),
            });
        }

        tracing::info!(url = %url, "configured fixture database");
        self.database_url = Some(url);
        Ok(self)
    }

    #[must_use]
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixture_data_dir = dir.into();
        self
    }

    #[must_use]
    pub fn schema_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_file_path = path.into();
        self
    }

    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `FIXTURE_*` variables resolved through `lookup`.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(DATABASE_URL_ENV) {
            config = config.database(&raw)?;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            config = config.data_dir(dir);
        }
        if let Some(path) = lookup(SCHEMA_FILE_ENV) {
            config = config.schema_file(path);
        }

        Ok(config)
    }

    pub fn validate(&self, backend_name: &'static str) -> Result<(), ConfigurationError> {
        let Some(url) = &self.database_url else {
            return Err(ConfigurationError::MissingDatabaseUrl);
        };

        if url.driver() != backend_name {
            return Err(ConfigurationError::DriverNotSupported {
                driver: url.driver().to_string(),
                supported: backend_name,
            });
        }

        if !self.fixture_data_dir.is_dir() {
            return Err(ConfigurationError::FixtureDataDirNotFound {
                path: self.fixture_data_dir.clone(),
            });
        }

        if !self.schema_file_path.is_file() {
            return Err(ConfigurationError::SchemaFileNotFound {
                path: self.schema_file_path.clone(),
            });
        }

        Ok(())
    }

    #[must_use]
    pub fn database_url(&self) -> Option<&DatabaseUrl> {
        self.database_url.as_ref()
    }

    #[must_use]
    pub fn fixture_data_dir(&self) -> &Path {
        &self.fixture_data_dir
    }

    #[must_use]
    pub fn schema_file_path(&self) -> &Path {
        &self.schema_file_path
    }
}
