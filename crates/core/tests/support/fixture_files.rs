use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

pub const SCHEMA_SQL: &str = r#"-- fixture test schema
CREATE TABLE `user` (
  id INTEGER PRIMARY KEY,
  name VARCHAR(64) NOT NULL,
  email VARCHAR(128)
);

CREATE TABLE "task" (
  id INTEGER PRIMARY KEY,
  user_id INTEGER NOT NULL,
  title VARCHAR(255) NOT NULL
);

CREATE TABLE foo (
  id INTEGER PRIMARY KEY,
  name VARCHAR(32)
);

CREATE TABLE 'bar' (
  id INTEGER PRIMARY KEY,
  title TEXT NOT NULL
);
"#;

pub const USER_YAML: &str = r#"version: "1.0"
table: user
rows:
  - id: 1
    name: alice
    email: alice@example.com
  - id: 2
    name: bob
    email: ~
"#;

pub const FOO_JSON: &str = r#"{
  "version": "1.0",
  "table": "foo",
  "rows": [
    {"id": 1, "name": "a"},
    {"id": 2, "name": null}
  ]
}
"#;

pub const BAR_SQL: &str = "INSERT INTO bar (id, title) VALUES (1, 'first');\nINSERT INTO bar (id, title) VALUES (2, 'second');\n";

/// A temporary schema file plus fixture directory:
/// `user.yml`, `foo.json`, `bar.sql`, an ambiguous `beep.{sql,json}`, and
/// nothing for `task` or `hidden`.
pub struct FixtureFiles {
    root: TempDir,
    pub schema_file: PathBuf,
    pub data_dir: PathBuf,
}

#[allow(dead_code)]
impl FixtureFiles {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create fixture tempdir");
        let schema_file = root.path().join("schema.sql");
        let data_dir = root.path().join("fixtures");
        fs::create_dir(&data_dir).expect("create fixture data dir");

        write(&schema_file, SCHEMA_SQL);
        write(&data_dir.join("user.yml"), USER_YAML);
        write(&data_dir.join("foo.json"), FOO_JSON);
        write(&data_dir.join("bar.sql"), BAR_SQL);
        write(&data_dir.join("beep.sql"), "SELECT 1;");
        write(&data_dir.join("beep.json"), "{}");

        Self {
            root,
            schema_file,
            data_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn write_fixture(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.data_dir.join(file_name);
        write(&path, content);
        path
    }
}

fn write(path: &Path, content: &str) {
    fs::write(path, content)
        .unwrap_or_else(|error| panic!("failed to write {}: {error}", path.display()));
}
