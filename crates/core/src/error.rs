use std::{error::Error as StdError, fmt, io, path::PathBuf};

use thiserror::Error;

use crate::DataFormat;

pub type BoxError = Box<dyn StdError + Send + Sync>;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification used by callers to decide between aborting and
/// logging-and-continuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Parse,
    Lookup,
    Execution,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigurationError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Execute(#[from] ExecutionError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Parse(_) | Self::Load(_) | Self::Export(_) => ErrorKind::Parse,
            Self::Lookup(_) => ErrorKind::Lookup,
            Self::Execute(_) => ErrorKind::Execution,
        }
    }

    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Execute(error) if error.is_already_exists())
    }
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("database url is not configured")]
    MissingDatabaseUrl,
    #[error("invalid database url '{raw}': expected '<driver>://<dsn>'")]
    InvalidDatabaseUrl { raw: String },
    #[error("db name not found in '{raw}'")]
    MissingDatabaseName { raw: String },
    #[error("invalid db name '{name}': test db name must start with 'test_'")]
    NotATestDatabase { name: String },
    #[error("driver '{driver}' is not supported (expected '{supported}')")]
    DriverNotSupported {
        driver: String,
        supported: &'static str,
    },
    #[error("fixture data dir not found: {}", path.display())]
    FixtureDataDirNotFound { path: PathBuf },
    #[error("schema file not found: {}", path.display())]
    SchemaFileNotFound { path: PathBuf },
    #[error("failed to read schema file {}", path.display())]
    SchemaRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "data format of extension '{extension}' is already bound to '{existing}', cannot rebind it to '{requested}'"
    )]
    ExtensionConflict {
        extension: String,
        existing: DataFormat,
        requested: DataFormat,
    },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot extract table name from sql '{statement}' (statement[{statement_index}])")]
    UnrecognizedStatement {
        statement_index: usize,
        statement: String,
    },
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("table '{name}' not found")]
    TableNotFound { name: String },
    #[error("fixture data not found for table '{table}'")]
    FixtureNotFound { table: String },
    #[error("multiple formats of fixture data found for table '{table}'")]
    MultipleFormats { table: String, paths: Vec<PathBuf> },
    #[error("loader not found for data format '{format}'")]
    LoaderNotFound { format: DataFormat },
    #[error("exporter not found for data format '{format}'")]
    ExporterNotFound { format: DataFormat },
}

/// How a backend classified a failed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    AlreadyExists,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => f.write_str("already-exists"),
            Self::Other => f.write_str("other"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to connect to '{target}'")]
    Connect {
        target: String,
        #[source]
        source: BoxError,
    },
    #[error("statement failed (kind={kind}): {sql}")]
    StatementFailed {
        sql: String,
        kind: FailureKind,
        #[source]
        source: BoxError,
    },
    #[error("failed to insert fixture data for table '{table}'")]
    FixtureInsert {
        table: String,
        #[source]
        source: Box<Error>,
    },
}

impl ExecutionError {
    pub fn statement_failed<E>(sql: impl Into<String>, kind: FailureKind, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::StatementFailed {
            sql: sql.into(),
            kind,
            source: Box::new(source),
        }
    }

    pub fn connect<E>(target: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Connect {
            target: target.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::StatementFailed {
                kind: FailureKind::AlreadyExists,
                ..
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read fixture file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode fixture file {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("inconsistent column '{column}' in row[{row}] of fixture file {}", path.display())]
    InconsistentColumn {
        path: PathBuf,
        row: usize,
        column: String,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("empty export content for table '{table}'")]
    EmptyContent { table: String },
    #[error("row[{row}] has {actual} values but {expected} columns were given")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("failed to encode export content for table '{table}'")]
    Encode {
        table: String,
        #[source]
        source: BoxError,
    },
}
