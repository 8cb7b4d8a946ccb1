use std::{
    fs,
    path::{Path, PathBuf},
};

use rusqlite::Connection;
use sqlfixture_core::{EngineConfig, FixtureEngine};
use sqlfixture_sqlite::SqliteBackend;
use tempfile::TempDir;

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE `user` (
  id INTEGER PRIMARY KEY,
  name VARCHAR(64) NOT NULL
);

CREATE TABLE task (
  id INTEGER PRIMARY KEY,
  user_id INTEGER NOT NULL,
  title VARCHAR(255) NOT NULL
);

CREATE TABLE foo (
  id INTEGER PRIMARY KEY,
  name VARCHAR(32)
);

CREATE TABLE bar (
  id INTEGER PRIMARY KEY,
  title TEXT NOT NULL
);

CREATE TABLE broken (
  id INTEGER PRIMARY KEY
);
"#;

const FOO_JSON: &str = r#"{
  "version": "1.0",
  "table": "foo",
  "rows": [
    {"id": 1, "name": "a"},
    {"id": 2, "name": null}
  ]
}
"#;

const BAR_YAML: &str = "version: \"1.0\"\ntable: bar\nrows:\n  - id: 1\n    title: first\n  - id: 2\n    title: \"it's second\"\n";

const BROKEN_SQL: &str = "INSERT INTO broken (id, missing_column) VALUES (1, 2);\n";

/// A scratch `test_fixtures.db` with its schema file and fixture directory.
/// `task` and `user` have no fixture file.
pub struct SqliteFixture {
    root: TempDir,
    pub schema_file: PathBuf,
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
}

#[allow(dead_code)]
impl SqliteFixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create sqlite fixture tempdir");
        let schema_file = root.path().join("schema.sql");
        let data_dir = root.path().join("fixtures");
        let database_path = root.path().join("test_fixtures.db");
        fs::create_dir(&data_dir).expect("create fixture data dir");

        write(&schema_file, SCHEMA_SQL);
        write(&data_dir.join("foo.json"), FOO_JSON);
        write(&data_dir.join("bar.yml"), BAR_YAML);
        write(&data_dir.join("broken.sql"), BROKEN_SQL);

        Self {
            root,
            schema_file,
            data_dir,
            database_path,
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}", self.database_path.display())
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig::default()
            .database(&self.url())
            .expect("scratch database url")
            .data_dir(&self.data_dir)
            .schema_file(&self.schema_file)
    }

    pub fn engine(&self) -> FixtureEngine {
        FixtureEngine::new(self.config(), SqliteBackend).expect("sqlite fixture engine")
    }

    pub fn connection(&self) -> Connection {
        Connection::open(&self.database_path).expect("open scratch database")
    }

    pub fn count(&self, table: &str) -> i64 {
        self.connection()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .unwrap_or_else(|error| panic!("count rows in {table}: {error}"))
    }

    pub fn table_exists(&self, table: &str) -> bool {
        let count: i64 = self
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .expect("query sqlite_master");
        count == 1
    }
}

fn write(path: &Path, content: &str) {
    fs::write(path, content)
        .unwrap_or_else(|error| panic!("failed to write {}: {error}", path.display()));
}
