use sqlfixture_core::{
    DataFormat, FormatRegistry, JsonLoader, LoadError, Loader, SqlLoader, YamlLoader,
};

#[path = "support/fixture_files.rs"]
mod fixture_files;

use fixture_files::{BAR_SQL, FixtureFiles};

#[test]
fn json_rows_render_null_and_quoted_literals() {
    let files = FixtureFiles::new();

    let sql = JsonLoader
        .load(&files.data_dir.join("foo.json"))
        .expect("load json fixture");

    assert_eq!(
        sql,
        "INSERT INTO `foo` (`id`, `name`)\nVALUES \n ('1', 'a'),\n('2', NULL);\n"
    );
}

#[test]
fn yaml_rows_keep_document_column_order() {
    let files = FixtureFiles::new();

    let sql = YamlLoader
        .load(&files.data_dir.join("user.yml"))
        .expect("load yaml fixture");

    assert_eq!(
        sql,
        "INSERT INTO `user` (`id`, `name`, `email`)\nVALUES \n ('1', 'alice', 'alice@example.com'),\n('2', 'bob', NULL);\n"
    );
}

#[test]
fn scalar_types_are_rendered_as_strings() {
    let files = FixtureFiles::new();
    let path = files.write_fixture(
        "flags.yml",
        "table: flags\nrows:\n  - enabled: true\n    ratio: 0.5\n    label: \"O'Brien\"\n",
    );

    let sql = YamlLoader.load(&path).expect("load yaml fixture");
    assert!(sql.contains("('true', '0.5', 'O''Brien')"), "{sql}");
}

#[test]
fn integers_beyond_i64_keep_every_digit() {
    let files = FixtureFiles::new();
    let json = files.write_fixture(
        "counters.json",
        r#"{"table": "counters", "rows": [{"id": 18446744073709551615, "delta": -9223372036854775808}]}"#,
    );
    let yaml = files.write_fixture(
        "counters.yml",
        "table: counters\nrows:\n  - id: 18446744073709551615\n    delta: -9223372036854775808\n",
    );

    let expected = "INSERT INTO `counters` (`id`, `delta`)\nVALUES \n ('18446744073709551615', '-9223372036854775808');\n";
    assert_eq!(JsonLoader.load(&json).expect("load json"), expected);
    assert_eq!(YamlLoader.load(&yaml).expect("load yaml"), expected);
}

#[test]
fn sql_fixture_is_passed_through_verbatim() {
    let files = FixtureFiles::new();

    let sql = SqlLoader
        .load(&files.data_dir.join("bar.sql"))
        .expect("load sql fixture");
    assert_eq!(sql, BAR_SQL);
}

#[test]
fn document_without_rows_loads_as_empty_statement() {
    let files = FixtureFiles::new();
    let path = files.write_fixture("empty.json", r#"{"version": "1.0", "table": "empty", "rows": []}"#);

    assert_eq!(JsonLoader.load(&path).expect("load empty fixture"), "");
}

#[test]
fn malformed_json_is_a_decode_error() {
    let files = FixtureFiles::new();
    let path = files.write_fixture("broken.json", r#"{"table": "broken", "rows": [ {"id": 1 "#);

    let error = JsonLoader.load(&path).expect_err("malformed json");
    assert!(matches!(error, LoadError::Decode { .. }));
    assert!(error.to_string().contains("broken.json"));
}

#[test]
fn nested_values_are_rejected() {
    let files = FixtureFiles::new();
    let path = files.write_fixture(
        "nested.json",
        r#"{"table": "nested", "rows": [{"id": 1, "tags": ["a", "b"]}]}"#,
    );

    let error = JsonLoader.load(&path).expect_err("arrays are not scalars");
    assert!(matches!(error, LoadError::Decode { .. }));
}

#[test]
fn missing_file_is_a_read_error() {
    let files = FixtureFiles::new();

    let error = SqlLoader
        .load(&files.data_dir.join("absent.sql"))
        .expect_err("missing file");
    assert!(matches!(error, LoadError::Read { .. }));
}

#[test]
fn registry_loader_matches_extension() {
    let files = FixtureFiles::new();
    let registry = FormatRegistry::with_builtin_formats();

    let format = registry
        .format_by_extension(".yml")
        .expect("yml is registered");
    assert_eq!(format, DataFormat::YAML);

    let loader = registry.loader(format).expect("yaml loader");
    let sql = loader
        .load(&files.data_dir.join("user.yml"))
        .expect("load via registry");
    assert!(sql.starts_with("INSERT INTO `user`"));
}
