use std::{io, path::PathBuf};

use miette::Report;
use sqlfixture_core::ErrorKind;

const EXPORT_CONTEXT: &str = "while exporting query results";
const FILE_WRITE_CONTEXT: &str = "while writing fixture file";

pub(crate) type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug)]
pub(crate) enum CliError {
    InvalidQuery {
        query: String,
        table: String,
    },
    OutputDirNotFound {
        path: PathBuf,
    },
    UnsupportedExtension {
        extension: String,
        registered: Vec<String>,
    },
    WriteFile {
        path: PathBuf,
        source: io::Error,
    },
    Core(sqlfixture_core::Error),
}

impl From<sqlfixture_core::Error> for CliError {
    fn from(value: sqlfixture_core::Error) -> Self {
        Self::Core(value)
    }
}

pub(crate) fn render_runtime_error(error: CliError) -> String {
    match error {
        CliError::InvalidQuery { query, table } => format!(
            "[usage] query must be a SELECT statement over table '{table}': {query}"
        ),
        CliError::OutputDirNotFound { path } => {
            format!("[config] output dir not found: {}", path.display())
        }
        CliError::UnsupportedExtension {
            extension,
            registered,
        } => format!(
            "[config] unsupported file extension '{extension}' (registered: {})",
            registered.join(", ")
        ),
        CliError::WriteFile { path, source } => {
            let context = format!("{FILE_WRITE_CONTEXT} `{}`", path.display());
            let report = report_with_context(source, context);
            format!("[io] {report}")
        }
        CliError::Core(source) => {
            let category = core_category(&source);
            let report = report_with_context(source, EXPORT_CONTEXT);
            format!("[{category}] {report}")
        }
    }
}

fn report_with_context<E, C>(source: E, context: C) -> Report
where
    E: std::error::Error + Send + Sync + 'static,
    C: Into<String>,
{
    let anyhow_error = anyhow::Error::new(source).context(context.into());
    miette::miette!("{anyhow_error:#}")
}

fn core_category(error: &sqlfixture_core::Error) -> &'static str {
    match error.kind() {
        ErrorKind::Configuration => "config",
        ErrorKind::Parse => "parse",
        ErrorKind::Lookup => "lookup",
        ErrorKind::Execution => "execute",
    }
}
