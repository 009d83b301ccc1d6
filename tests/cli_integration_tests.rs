// End-to-end tests for the frozen-audit binary
//
// Each test writes a small results directory of BER tables and checks the
// console output of one invocation.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_run(dir: &Path, file: &str, ber: &[f64]) {
    let mut text = String::from("index,BER\n");
    for (i, b) in ber.iter().enumerate() {
        text.push_str(&format!("{},{}\n", i, b));
    }
    fs::write(dir.join(file), text).unwrap();
}

/// Three runs, N=4; run2 is inverted so nothing is commonly frozen
fn disagreeing_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_run(dir.path(), "run1.csv", &[0.1, 0.2, 0.3, 0.4]);
    write_run(dir.path(), "run2.csv", &[0.4, 0.3, 0.2, 0.1]);
    write_run(dir.path(), "run3.csv", &[0.1, 0.2, 0.3, 0.4]);
    dir
}

fn agreeing_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_run(dir.path(), "snr_1db.csv", &[0.01, 0.45, 0.30, 0.002]);
    write_run(dir.path(), "snr_2db.csv", &[0.005, 0.40, 0.25, 0.001]);
    dir
}

#[test]
fn test_text_report_disagreement() {
    let dir = disagreeing_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.arg("-d").arg(dir.path()).args(["-N", "4", "-K", "2"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Block length (N): 4"))
        .stdout(predicate::str::contains("Information bits (K): 2"))
        .stdout(predicate::str::contains("Frozen bits (N-K): 2"))
        .stdout(predicate::str::contains("Found 3 files."))
        .stdout(predicate::str::contains(
            "[Result] Common frozen indices: 0 (target was 2)",
        ))
        .stdout(predicate::str::contains("WARNING: disagreement found"))
        .stdout(predicate::str::contains("Common frozen indices (0): []"))
        .stdout(predicate::str::contains("Most controversial indices"));
}

#[test]
fn test_text_report_agreement() {
    let dir = agreeing_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.arg("--dir").arg(dir.path()).args(["-N", "4", "-K", "2"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS: all runs agree"))
        .stdout(predicate::str::contains("Common frozen indices (2): [1, 2]"));
}

#[test]
fn test_row_count_mismatch_is_skipped() {
    let dir = disagreeing_dir();
    write_run(dir.path(), "truncated.csv", &[0.1, 0.2, 0.3]);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.arg("-d").arg(dir.path()).args(["-N", "4", "-K", "2"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Found 4 files."))
        .stdout(predicate::str::contains(
            "Warning: truncated.csv has 3 rows, expected N=4. Skipping.",
        ))
        .stdout(predicate::str::contains("[Result] Common frozen indices: 0"));
}

#[test]
fn test_malformed_file_is_skipped() {
    let dir = agreeing_dir();
    fs::write(dir.path().join("broken.csv"), "index,BER\n0,x\n1,0.1\n2,0.2\n3,0.3\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.arg("-d").arg(dir.path()).args(["-N", "4", "-K", "2"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Warning: broken.csv line 2: invalid BER"))
        .stdout(predicate::str::contains("SUCCESS"));
}

#[test]
fn test_no_valid_runs_stops_early() {
    let dir = TempDir::new().unwrap();
    write_run(dir.path(), "short.csv", &[0.1, 0.2]);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.arg("-d").arg(dir.path()).args(["-N", "4"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No valid runs to analyze."))
        .stdout(predicate::str::contains("[Result]").not());
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.arg("-d").arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Error: no files matching"))
        .stdout(predicate::str::contains("No valid runs to analyze."));
}

#[test]
fn test_missing_directory_falls_back_to_cwd() {
    let dir = agreeing_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.current_dir(dir.path())
        .args(["-d", "does_not_exist", "-N", "4", "-K", "2"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Input directory not found"))
        .stdout(predicate::str::contains("Found 2 files."))
        .stdout(predicate::str::contains("SUCCESS"));
}

#[test]
fn test_half_mode() {
    let dir = agreeing_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.arg("-d").arg(dir.path()).args(["-N", "4", "--half"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Frozen bits (N-K): 2"))
        .stdout(predicate::str::contains("Common frozen indices (2): [1, 2]"));
}

#[test]
fn test_json_output() {
    let dir = disagreeing_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.arg("-d")
        .arg(dir.path())
        .args(["-N", "4", "-K", "2", "--format", "json"]);

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(json["config"]["block_length"], 4);
    assert_eq!(json["config"]["n_frozen"], 2);
    assert_eq!(json["agreement"]["common_count"], 0);
    assert_eq!(json["agreement"]["passed"], false);
    assert_eq!(json["runs"].as_array().unwrap().len(), 3);
    assert_eq!(json["runs"][1]["name"], "run2");
    assert_eq!(json["runs"][1]["frozen"], serde_json::json!([0, 1]));
    assert_eq!(json["correlation"]["matrix"][0][0], 1.0);
    assert_eq!(json["discovery"]["files_found"], 3);
}

#[test]
fn test_csv_output() {
    let dir = disagreeing_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.arg("-d")
        .arg(dir.path())
        .args(["-N", "4", "-K", "2", "--format", "csv"]);

    cmd.assert().success().stdout(predicate::eq(
        "run,0,1,2,3\nrun1,0,0,1,1\nrun2,1,1,0,0\nrun3,0,0,1,1\nCOMMON,0,0,0,0\n",
    ));
}

#[test]
fn test_html_report_written() {
    let dir = agreeing_dir();
    let out = TempDir::new().unwrap();
    let html = out.path().join("report.html");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.arg("-d")
        .arg(dir.path())
        .args(["-N", "4", "-K", "2", "--html"])
        .arg(&html);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("HTML report written to"));

    let content = fs::read_to_string(&html).unwrap();
    assert!(content.contains("COMMON"));
    assert!(content.contains("snr_1db"));
    assert!(content.contains("<svg"));
}

#[test]
fn test_config_file() {
    let dir = disagreeing_dir();
    let config = dir.path().join("analysis.toml");
    fs::write(
        &config,
        format!(
            "block_length = 4\ninfo_bits = 3\ninput_dir = {:?}\ntop_controversial = 1\n",
            dir.path().display().to_string()
        ),
    )
    .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.arg("--config").arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Frozen bits (N-K): 1"))
        .stdout(predicate::str::contains("[Result] Common frozen indices: 0 (target was 1)"));
}

#[test]
fn test_invalid_configuration_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.args(["-N", "4", "-K", "5"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_half_conflicts_with_info_bits() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("frozen-audit");
    cmd.args(["--half", "-K", "2"]);

    cmd.assert().failure();
}
