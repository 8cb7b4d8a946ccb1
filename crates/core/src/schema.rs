use std::{fs, path::Path, sync::LazyLock};

use regex::Regex;

use crate::{ConfigurationError, ParseError, Result};

const STATEMENT_TERMINATOR: char = ';';
const QUOTE_CHARS: [char; 3] = ['`', '\'', '"'];

static CREATE_TABLE_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^CREATE\s+(?:\w+\s+)*?TABLE\s+(IF\s+NOT\s+EXISTS\s+)?([^(]+?)\s*\(")
        .unwrap_or_else(|error| panic!("invalid CREATE TABLE pattern: {error}"))
});

/// One table declared in the schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    name: String,
    create_statement: String,
    if_not_exists: bool,
}

impl TableDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, create_statement: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            create_statement: create_statement.into(),
            if_not_exists: false,
        }
    }

    /// Marks the statement as `CREATE TABLE IF NOT EXISTS`, which succeeds
    /// silently on an existing table.
    #[must_use]
    pub fn with_if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = if_not_exists;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn create_statement(&self) -> &str {
        &self.create_statement
    }

    #[must_use]
    pub fn if_not_exists(&self) -> bool {
        self.if_not_exists
    }
}

pub fn parse_schema_file(path: &Path) -> Result<Vec<TableDescriptor>> {
    let sql = fs::read_to_string(path).map_err(|source| ConfigurationError::SchemaRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_schema(&sql)?)
}

/// Extracts every `CREATE TABLE` statement, in source order. `--` comments
/// are dropped before statements are split, and terminators inside quotes do
/// not end a statement.
pub fn parse_schema(sql: &str) -> std::result::Result<Vec<TableDescriptor>, ParseError> {
    let mut tables = Vec::new();

    for (statement_index, segment) in split_statements(sql).into_iter().enumerate() {
        let statement = drop_blank_lines(&segment);
        if statement.is_empty() {
            continue;
        }

        let captures = CREATE_TABLE_RULE.captures(&statement);
        let if_not_exists = captures
            .as_ref()
            .is_some_and(|captures| captures.get(1).is_some());
        let name = captures
            .as_ref()
            .and_then(|captures| captures.get(2))
            .map(|name| trim_table_name(name.as_str()))
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ParseError::UnrecognizedStatement {
                statement_index,
                statement: statement.clone(),
            })?;

        tables.push(TableDescriptor {
            name,
            create_statement: statement,
            if_not_exists,
        });
    }

    Ok(tables)
}

fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut open_quote: Option<char> = None;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        if let Some(quote) = open_quote {
            current.push(ch);
            if ch == quote {
                open_quote = None;
            }
            continue;
        }

        match ch {
            '-' if chars.peek() == Some(&'-') => {
                // comment runs to end of line; keep the newline
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            STATEMENT_TERMINATOR => statements.push(std::mem::take(&mut current)),
            quote if QUOTE_CHARS.contains(&quote) => {
                open_quote = Some(quote);
                current.push(quote);
            }
            other => current.push(other),
        }
    }
    statements.push(current);

    statements
}

fn drop_blank_lines(segment: &str) -> String {
    segment
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn trim_table_name(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !QUOTE_CHARS.contains(ch))
        .collect::<String>()
        .trim()
        .to_string()
}
