use std::fs;

use casey_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("exports").join("nested");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn binary_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer
        .write_bytes("generated_test_cases.docx", b"PK\x03\x04one")
        .unwrap();
    assert_eq!(first.file_name().unwrap(), "generated_test_cases.docx");
    assert_eq!(fs::read(&first).unwrap(), b"PK\x03\x04one");

    let second = writer
        .write_bytes("generated_test_cases.docx", b"PK\x03\x04two")
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"PK\x03\x04two");

    // Only the target remains; the temp file was renamed into place.
    let entries = fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("report.json", "{}");
    assert!(matches!(result, Err(PersistError::OutputDir(_))));
    assert!(!file_path.with_file_name("report.json").exists());
}

#[test]
fn path_separators_in_names_are_refused() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("out"));
    let result = writer.write_bytes("../escape.docx", b"x");
    assert!(matches!(result, Err(PersistError::FileName(_))));
    assert!(!temp.path().join("escape.docx").exists());
}
