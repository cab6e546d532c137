use std::fs;

use casey_core::{InputSource, ReportDraft, TestCase, TestResult, TestStatus};
use casey_engine::{report_filename, Exporter, TEST_CASES_FILENAME, TEST_RESULTS_FILENAME};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

fn draft() -> ReportDraft {
    ReportDraft {
        generation_method: Some(InputSource::Website),
        source_url: Some("https://shop.example.com".to_string()),
        execution_url: Some("https://staging.example.com".to_string()),
        tests: vec![TestCase::new(1, "Login"), TestCase::new(2, "Search")],
        results: vec![
            TestResult::new(1, "Login", TestStatus::Passed).with_duration_ms(900),
            TestResult::new(2, "Search", TestStatus::Failed).with_message("timeout"),
        ],
    }
}

#[test]
fn report_filename_uses_unix_millis() {
    let now = Utc.timestamp_millis_opt(1_767_225_600_123).unwrap();
    assert_eq!(report_filename(now), "casey-ai-test-report-1767225600123.json");
}

#[test]
fn report_is_pretty_camel_case_json() {
    let temp = TempDir::new().unwrap();
    let exporter = Exporter::new(temp.path().to_path_buf());
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

    let path = exporter.save_report(draft(), now).unwrap();
    assert_eq!(path, temp.path().join(report_filename(now)));

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\n  \"generationMethod\""));
    let body: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(body["generationMethod"], json!("website"));
    assert_eq!(body["executionUrl"], json!("https://staging.example.com"));
    assert_eq!(body["results"][0]["duration"], json!(900));
    assert_eq!(
        body["summary"],
        json!({
            "total": 2,
            "passed": 1,
            "failed": 1,
            "timestamp": "2026-01-01T00:00:00.000Z"
        })
    );
}

#[test]
fn direct_mode_report_has_null_generation_method() {
    let temp = TempDir::new().unwrap();
    let exporter = Exporter::new(temp.path().join("out"));
    let mut draft = draft();
    draft.generation_method = None;
    draft.source_url = None;

    let path = exporter.save_report(draft, Utc::now()).unwrap();
    let body: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(body["generationMethod"], Value::Null);
    assert_eq!(body["sourceUrl"], Value::Null);
}

#[test]
fn documents_use_fixed_names() {
    let temp = TempDir::new().unwrap();
    let exporter = Exporter::new(temp.path().to_path_buf());

    let tests = exporter.save_test_cases(b"cases").unwrap();
    let results = exporter.save_test_results(b"results").unwrap();
    assert_eq!(tests.file_name().unwrap(), TEST_CASES_FILENAME);
    assert_eq!(results.file_name().unwrap(), TEST_RESULTS_FILENAME);
    assert_eq!(fs::read(results).unwrap(), b"results");
}
