use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use qms_report::ReportJob;

const JOB: &str = r#"{
  "reportType": "Full Non-Conformance Report",
  "rows": [
    {"id": 1, "code": "NC-1", "title": "Scratched housing", "status": "Open"},
    {"id": 2, "code": "NC-2", "title": "Wrong label", "status": "Closed"}
  ]
}"#;

fn write_job(dir: &std::path::Path, json: &str) -> std::path::PathBuf {
    let path = dir.join("job.json");
    std::fs::write(&path, json).expect("job file should be written");
    path
}

#[test]
fn example_job_is_valid_json() {
    let output = cargo_bin_cmd!("qms-report")
        .arg("--example")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let job: ReportJob = serde_json::from_slice(&output).expect("example should parse");
    assert_eq!(job.label(), Some("Full Non-Conformance Report"));
    assert_eq!(job.rows.len(), 2);
}

#[test]
fn writes_pdf_to_output_path() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let job = write_job(temp.path(), JOB);
    let output_path = temp.path().join("out.pdf");

    cargo_bin_cmd!("qms-report")
        .arg(&job)
        .arg("-o")
        .arg(&output_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("pages) to"));

    let bytes = std::fs::read(&output_path).expect("output should exist");
    assert!(bytes.starts_with(b"%PDF-1.7"));
}

#[test]
fn default_output_uses_report_file_name() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let job = write_job(temp.path(), JOB);

    cargo_bin_cmd!("qms-report")
        .current_dir(temp.path())
        .arg(&job)
        .arg("--date")
        .arg("2026-03-09")
        .assert()
        .success();

    let expected = temp.path().join("Full_Non-Conformance_Report_20260309.pdf");
    assert!(expected.is_file(), "{} missing", expected.display());
}

#[test]
fn reads_stdin_and_prints_base64() {
    cargo_bin_cmd!("qms-report")
        .arg("--base64")
        .write_stdin(JOB)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("JVBERi0xLjc"));
}

#[test]
fn invalid_json_reports_hint() {
    cargo_bin_cmd!("qms-report")
        .write_stdin(r#"{"reportType": "Audit Schedule", "rows": [,]}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Hint"));
}

#[test]
fn missing_report_type_fails() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let job = write_job(temp.path(), r#"{"rows": []}"#);

    cargo_bin_cmd!("qms-report")
        .current_dir(temp.path())
        .arg(&job)
        .assert()
        .failure()
        .stderr(predicate::str::contains("report type"));
}

fn job_with_overlong_cell() -> String {
    let rows: Vec<serde_json::Value> = (1..=6)
        .map(|i| {
            let title = if i == 3 {
                "nonconformity ".repeat(2500)
            } else {
                "Label faded".to_string()
            };
            serde_json::json!({ "code": format!("NC-{i}"), "title": title, "status": "Open" })
        })
        .collect();
    serde_json::json!({ "reportType": "Non-Conformances", "rows": rows }).to_string()
}

#[test]
fn warnings_reach_stderr_by_default() {
    cargo_bin_cmd!("qms-report")
        .env_remove("RUST_LOG")
        .arg("--base64")
        .write_stdin(job_with_overlong_cell())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("JVBERi0xLjc"))
        .stderr(predicate::str::contains("truncated to"));
}

#[test]
fn debug_logging_follows_rust_log() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let job = write_job(temp.path(), JOB);

    cargo_bin_cmd!("qms-report")
        .env("RUST_LOG", "qms_report=debug")
        .current_dir(temp.path())
        .arg(&job)
        .assert()
        .success()
        .stderr(predicate::str::contains("Tabular body"))
        .stderr(predicate::str::contains("detail appendix"));
}
