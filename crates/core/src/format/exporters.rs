use super::{Exporter, FixtureDocument, document::quote_literal};
use crate::ExportError;

/// Writes a multi-row `INSERT` statement.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlExporter;

impl Exporter for SqlExporter {
    fn export(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Option<String>>],
    ) -> Result<Vec<u8>, ExportError> {
        ensure_exportable(table, columns, rows)?;

        let tuples = rows
            .iter()
            .map(|row| {
                let values = row
                    .iter()
                    .map(|value| match value {
                        Some(value) => quote_literal(value).replace('\n', "\\n"),
                        None => "NULL".to_string(),
                    })
                    .collect::<Vec<_>>();
                format!("    ({})", values.join(", "))
            })
            .collect::<Vec<_>>();

        let statement = format!(
            "INSERT INTO {table} ({})\nVALUES \n{};\n",
            columns.join(", "),
            tuples.join(",\n")
        );
        Ok(statement.into_bytes())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Option<String>>],
    ) -> Result<Vec<u8>, ExportError> {
        ensure_exportable(table, columns, rows)?;

        let document = FixtureDocument::from_query(table, columns, rows);
        serde_json::to_vec_pretty(&document).map_err(|source| ExportError::Encode {
            table: table.to_string(),
            source: Box::new(source),
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct YamlExporter;

impl Exporter for YamlExporter {
    fn export(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Option<String>>],
    ) -> Result<Vec<u8>, ExportError> {
        ensure_exportable(table, columns, rows)?;

        let document = FixtureDocument::from_query(table, columns, rows);
        serde_yaml::to_string(&document)
            .map(String::into_bytes)
            .map_err(|source| ExportError::Encode {
                table: table.to_string(),
                source: Box::new(source),
            })
    }
}

fn ensure_exportable(
    table: &str,
    columns: &[String],
    rows: &[Vec<Option<String>>],
) -> Result<(), ExportError> {
    if columns.is_empty() || rows.is_empty() {
        return Err(ExportError::EmptyContent {
            table: table.to_string(),
        });
    }

    if let Some((row, values)) = rows
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() != columns.len())
    {
        return Err(ExportError::RowWidthMismatch {
            row,
            expected: columns.len(),
            actual: values.len(),
        });
    }

    Ok(())
}
