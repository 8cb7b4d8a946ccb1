//! `fixturegen`: dumps a query result into a fixture file that the engine can
//! load back.

mod error_presentation;
mod export;

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use sqlfixture_core::FormatRegistry;
use tracing_subscriber::EnvFilter;

use crate::{
    error_presentation::render_runtime_error,
    export::{ExportOutcome, ExportRequest},
};

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "fixturegen")]
#[command(about = "Export query results into a fixture file")]
#[command(version)]
struct Cli {
    /// Source database, e.g. sqlite:///path/to/app.db
    #[arg(long, env = "FIXTURE_DATABASE_URL")]
    url: String,

    /// Table the fixture file is named after
    #[arg(short, long)]
    table: String,

    /// SELECT statement to export [default: SELECT * FROM <table> ORDER BY id LIMIT 10]
    #[arg(short, long)]
    query: Option<String>,

    /// Directory the fixture file is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// File extension selecting the export format
    #[arg(long, default_value = ".yml")]
    ext: String,
}

impl From<Cli> for ExportRequest {
    fn from(cli: Cli) -> Self {
        Self {
            url: cli.url,
            table: cli.table,
            query: cli.query,
            output_dir: cli.output_dir,
            extension: cli.ext,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let registry = FormatRegistry::global();
    match export::run(&ExportRequest::from(cli), &registry) {
        Ok(ExportOutcome::Written(path)) => {
            println!(
                "fixturegen: exported query results to '{}'",
                path.display()
            );
            ExitCode::SUCCESS
        }
        Ok(ExportOutcome::Empty) => {
            println!("fixturegen: query returned no rows, nothing exported");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", render_runtime_error(error));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
