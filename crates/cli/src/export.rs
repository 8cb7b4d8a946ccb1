use std::{fs, path::PathBuf};

use sqlfixture_core::{Backend, ConfigurationError, DatabaseUrl, FormatRegistry};
use sqlfixture_sqlite::SqliteBackend;
use tracing::info;

use crate::error_presentation::{CliError, CliResult};

const SELECT_KEYWORD: &str = "SELECT";

#[derive(Debug, Clone)]
pub(crate) struct ExportRequest {
    pub(crate) url: String,
    pub(crate) table: String,
    pub(crate) query: Option<String>,
    pub(crate) output_dir: PathBuf,
    pub(crate) extension: String,
}

#[derive(Debug)]
pub(crate) enum ExportOutcome {
    Written(PathBuf),
    Empty,
}

pub(crate) fn run(request: &ExportRequest, registry: &FormatRegistry) -> CliResult<ExportOutcome> {
    let query = request
        .query
        .clone()
        .unwrap_or_else(|| default_query(&request.table));
    validate_query(&query, &request.table)?;

    if !request.output_dir.is_dir() {
        return Err(CliError::OutputDirNotFound {
            path: request.output_dir.clone(),
        });
    }

    let format = registry
        .format_by_extension(&request.extension)
        .ok_or_else(|| CliError::UnsupportedExtension {
            extension: request.extension.clone(),
            registered: registry
                .extensions()
                .into_iter()
                .map(|(extension, _)| extension)
                .collect(),
        })?;
    let exporter = registry.exporter(format).map_err(sqlfixture_core::Error::from)?;

    let url = DatabaseUrl::parse(&request.url).map_err(sqlfixture_core::Error::from)?;
    let backend = SqliteBackend;
    if url.driver() != backend.name() {
        return Err(sqlfixture_core::Error::from(ConfigurationError::DriverNotSupported {
            driver: url.driver().to_string(),
            supported: backend.name(),
        })
        .into());
    }

    let adapter = backend.connect(&url)?;
    let rows = adapter.query(&query)?;
    if rows.is_empty() {
        info!(table = %request.table, "query returned no rows");
        return Ok(ExportOutcome::Empty);
    }

    let content = exporter
        .export(&request.table, &rows.columns, &rows.rows)
        .map_err(sqlfixture_core::Error::from)?;

    let path = request.output_dir.join(format!(
        "{}.{}",
        request.table,
        request.extension.trim().trim_start_matches('.')
    ));
    fs::write(&path, content).map_err(|source| CliError::WriteFile {
        path: path.clone(),
        source,
    })?;
    info!(table = %request.table, path = %path.display(), rows = rows.rows.len(), "fixture exported");

    Ok(ExportOutcome::Written(path))
}

fn default_query(table: &str) -> String {
    format!("SELECT * FROM {table} ORDER BY id LIMIT 10")
}

fn validate_query(query: &str, table: &str) -> CliResult<()> {
    let trimmed = query.trim_start();
    let is_select = trimmed
        .get(..SELECT_KEYWORD.len())
        .is_some_and(|keyword| keyword.eq_ignore_ascii_case(SELECT_KEYWORD));

    if is_select && query.contains(table) {
        Ok(())
    } else {
        Err(CliError::InvalidQuery {
            query: query.to_string(),
            table: table.to_string(),
        })
    }
}
