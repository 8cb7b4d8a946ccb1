use std::path::{Path, PathBuf};

use crate::{ConfigurationError, DataFormat, FormatRegistry, LookupError, Result, TableDescriptor};

/// The fixture file resolved for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureLocation {
    pub path: PathBuf,
    pub format: DataFormat,
}

/// Finds the single `<table><ext>` file in `data_dir` across every extension
/// known to `registry`. Ambiguity is an error, never resolved by precedence.
pub fn locate(
    registry: &FormatRegistry,
    data_dir: &Path,
    table: &TableDescriptor,
) -> Result<FixtureLocation> {
    if !data_dir.is_dir() {
        return Err(ConfigurationError::FixtureDataDirNotFound {
            path: data_dir.to_path_buf(),
        }
        .into());
    }

    let mut found: Vec<FixtureLocation> = registry
        .extensions()
        .into_iter()
        .map(|(extension, format)| FixtureLocation {
            path: data_dir.join(format!("{}{extension}", table.name())),
            format,
        })
        .filter(|candidate| candidate.path.is_file())
        .collect();

    match found.len() {
        0 => Err(LookupError::FixtureNotFound {
            table: table.name().to_string(),
        }
        .into()),
        1 => Ok(found.remove(0)),
        _ => Err(LookupError::MultipleFormats {
            table: table.name().to_string(),
            paths: found.into_iter().map(|location| location.path).collect(),
        }
        .into()),
    }
}
