use std::{fs, path::Path};

use super::{FixtureDocument, FixtureValue, Loader};
use crate::LoadError;

/// Passes a raw SQL fixture file through verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlLoader;

impl Loader for SqlLoader {
    fn load(&self, path: &Path) -> Result<String, LoadError> {
        read_fixture(path)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLoader;

impl Loader for JsonLoader {
    fn load(&self, path: &Path) -> Result<String, LoadError> {
        let content = read_fixture(path)?;
        let document: FixtureDocument<FixtureValue> =
            serde_json::from_str(&content).map_err(|source| LoadError::Decode {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;
        render_insert(path, &document)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct YamlLoader;

impl Loader for YamlLoader {
    fn load(&self, path: &Path) -> Result<String, LoadError> {
        let content = read_fixture(path)?;
        let document: FixtureDocument<FixtureValue> =
            serde_yaml::from_str(&content).map_err(|source| LoadError::Decode {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;
        render_insert(path, &document)
    }
}

/// Renders a structured document as one multi-row `INSERT`. Columns follow
/// the first row; a later row missing one of them is an error. Returns an
/// empty string when the document names no table or has no rows.
pub fn render_insert(
    path: &Path,
    document: &FixtureDocument<FixtureValue>,
) -> Result<String, LoadError> {
    let Some(first_row) = document.rows.first() else {
        return Ok(String::new());
    };
    if document.table.is_empty() {
        return Ok(String::new());
    }

    let columns: Vec<&String> = first_row.keys().collect();

    let mut tuples = Vec::with_capacity(document.rows.len());
    for (row_index, row) in document.rows.iter().enumerate() {
        let mut fields = Vec::with_capacity(columns.len());
        for column in &columns {
            let value = row
                .get(*column)
                .ok_or_else(|| LoadError::InconsistentColumn {
                    path: path.to_path_buf(),
                    row: row_index,
                    column: (*column).clone(),
                })?;
            fields.push(value.to_sql_literal());
        }
        tuples.push(format!("({})", fields.join(", ")));
    }

    let quoted_columns = columns
        .iter()
        .map(|column| quote_identifier(column))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "INSERT INTO {} ({})\nVALUES \n {};\n",
        quote_identifier(&document.table),
        quoted_columns,
        tuples.join(",\n")
    ))
}

fn quote_identifier(identifier: &str) -> String {
    format!("`{identifier}`")
}

fn read_fixture(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}
