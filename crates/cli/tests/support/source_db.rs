use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

use rusqlite::Connection;
use tempfile::TempDir;

/// A source database with a populated `user` table and an empty `task`.
pub struct SourceDb {
    root: TempDir,
    pub database_path: PathBuf,
    pub output_dir: PathBuf,
}

#[allow(dead_code)]
impl SourceDb {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create source tempdir");
        let database_path = root.path().join("app.db");
        let output_dir = root.path().join("fixtures");
        std::fs::create_dir(&output_dir).expect("create output dir");

        let connection = Connection::open(&database_path).expect("open source db");
        connection
            .execute_batch(
                "CREATE TABLE user (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT);
                 CREATE TABLE task (id INTEGER PRIMARY KEY, title TEXT NOT NULL);
                 INSERT INTO user VALUES (2, 'bob', NULL);
                 INSERT INTO user VALUES (1, 'alice', 'alice@example.com');",
            )
            .expect("seed source db");

        Self {
            root,
            database_path,
            output_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}", self.database_path.display())
    }

    pub fn output_arg(&self) -> String {
        self.output_dir.to_string_lossy().into_owned()
    }
}

pub fn run_fixturegen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fixturegen"))
        .args(args)
        .env_remove("FIXTURE_DATABASE_URL")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|error| panic!("failed to run fixturegen: {error}"))
}
