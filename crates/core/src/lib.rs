//! Schema-driven database test fixtures.
//!
//! A [`FixtureEngine`] parses a schema file, creates its tables in a scratch
//! database and hands out [`Scope`]s: named subsets of tables loaded with rows
//! from per-table fixture files, cleared again when the test is done.

mod adapter;
mod config;
mod engine;
mod error;
mod format;
mod lifecycle;
mod locator;
mod schema;
mod scope;
mod transaction;

pub use adapter::{Backend, DatabaseAdapter, QueryRows};
pub use config::{
    DATA_DIR_ENV, DATABASE_URL_ENV, DEFAULT_FIXTURE_DATA_DIR, DEFAULT_SCHEMA_FILE_NAME,
    DatabaseUrl, EngineConfig, SCHEMA_FILE_ENV, TEST_DATABASE_PREFIX,
};
pub use engine::FixtureEngine;
pub use error::{
    BoxError, ConfigurationError, Error, ErrorKind, ExecutionError, ExportError, FailureKind,
    LoadError, LookupError, ParseError, Result,
};
pub use format::{
    DataFormat, Exporter, FixtureDocument, FixtureValue, FormatRegistry, JsonExporter, JsonLoader,
    Loader, SqlExporter, SqlLoader, YamlExporter, YamlLoader, render_insert,
};
pub use lifecycle::{
    CleanupFailure, CleanupReport, CreateOutcome, create_tables, drop_tables, truncate_tables,
};
pub use locator::{FixtureLocation, locate};
pub use schema::{TableDescriptor, parse_schema, parse_schema_file};
pub use scope::Scope;
pub use transaction::{BEGIN_SQL, COMMIT_SQL, ROLLBACK_SQL, Transaction, with_transaction};
