use std::io::Write;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::{NamedTempFile, TempDir};

const VALID: &str = r#"[
    {
        "title": "Zero to One",
        "subtitle": "Notes on Startups, or How to Build the Future",
        "author": "Peter Thiel",
        "publisher": "Ballantine Books",
        "isbn_10": "0753555190",
        "isbn_13": "978-0753555194",
        "price": 14.29,
        "author2": { "name": "Peter Thiel", "verified": true }
    },
    {
        "title": "The Pragmatic Programmer",
        "author": "Andrew Hunt",
        "publisher": "Addison-Wesley",
        "isbn_13": "978-0201616224",
        "price": 39.99
    }
]"#;

const BAD_CHECKSUM: &str = r#"[
    {
        "title": "Zero to One",
        "author": "Peter Thiel",
        "publisher": "Ballantine Books",
        "isbn_10": "0753555191",
        "price": 14.29
    }
]"#;

fn catalog(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Command isolated from any `config/` directory in the working tree.
fn cli(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-cli").unwrap();
    cmd.env("BOOKSHELF_CONFIG_DIR", config_dir.path())
        .env_remove("BOOKSHELF_ENV")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_validate_prints_every_book() {
    let config = TempDir::new().unwrap();
    let file = catalog(VALID);

    let output = cli(&config).arg("validate").arg(file.path()).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("title='zero to one'"));
    assert!(stdout.contains("title='the pragmatic programmer'"));
    assert!(stdout.contains("2 record(s) valid"));
}

#[test]
fn test_validate_json_output() {
    let config = TempDir::new().unwrap();
    let file = catalog(VALID);

    let output = cli(&config)
        .args(["--json", "validate"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let books: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(books[0]["publisher"], "ballantine books");
    assert_eq!(books[1]["isbn_10"], Value::Null);
}

#[test]
fn test_validate_reports_checksum_failure() {
    let config = TempDir::new().unwrap();
    let file = catalog(BAD_CHECKSUM);

    let output = cli(&config)
        .args(["--json", "validate"])
        .arg(file.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8(output.stderr).unwrap();
    let body_line = stderr
        .lines()
        .find(|line| line.starts_with("{\"error\""))
        .expect("structured error body on stderr");
    let body: Value = serde_json::from_str(body_line).unwrap();
    assert_eq!(body["error"]["code"], "isbn10_format");
    assert_eq!(body["error"]["index"], 0);
    assert_eq!(
        body["error"]["message"],
        "ISBN10 digit sum should be divisible by 11."
    );
}

#[test]
fn test_show_excludes_fields() {
    let config = TempDir::new().unwrap();
    let file = catalog(VALID);

    let output = cli(&config)
        .arg("show")
        .arg(file.path())
        .args(["--exclude", "price"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let snapshot: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(snapshot.get("price").is_none());
    assert_eq!(snapshot["title"], "zero to one");
}

#[test]
fn test_show_index_out_of_range() {
    let config = TempDir::new().unwrap();
    let file = catalog(VALID);

    cli(&config)
        .arg("show")
        .arg(file.path())
        .args(["--index", "5"])
        .assert()
        .failure();
}

#[test]
fn test_check_isbn() {
    let config = TempDir::new().unwrap();

    let output = cli(&config)
        .args(["check-isbn", "0-7535-5519-0"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), "valid");

    cli(&config)
        .args(["check-isbn", "075355519"])
        .assert()
        .failure();
}
