mod common;

use assert_cmd::Command;
use common::TestWorkspace;
use predicates::prelude::*;

fn pipeline_cmd() -> Command {
    let mut cmd = Command::cargo_bin("landkreis-stats").expect("binary exists");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn run_reports_summary_and_writes_outputs() {
    let workspace = TestWorkspace::new();
    let data_dir = workspace.seed_raw_data();

    pipeline_cmd()
        .args(["--data-dir", data_dir.to_str().unwrap(), "--preview", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Pipeline finished: 3 region(s), 5 drive/emission column(s), 10 file(s) written",
        ))
        .stdout(predicate::str::contains(
            "accidents_per_10k_vehicles: still missing for Region Hannover",
        ))
        .stderr(predicate::str::contains("Loading vehicles data"));

    assert!(data_dir.join("processed/vehicles_combined.csv").is_file());
    assert!(data_dir.join("interim/emission_classes_pct.csv").is_file());
}

#[test]
fn profile_flag_prints_column_descriptions() {
    let workspace = TestWorkspace::new();
    let data_dir = workspace.seed_raw_data();

    pipeline_cmd()
        .args([
            "--data-dir",
            data_dir.to_str().unwrap(),
            "--preview",
            "0",
            "--profile",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("description"))
        .stdout(predicate::str::contains("Verfügbares Einkommen je Einwohner in EUR"))
        .stdout(predicate::str::contains("not relevant"));
}

#[test]
fn config_file_overrides_defaults() {
    let workspace = TestWorkspace::new();
    let data_dir = workspace.seed_raw_data();
    let config = workspace.write(
        "pipeline.yml",
        "correlation_columns:\n  - region_id\n  - vehicles_per_capita\n",
    );

    pipeline_cmd()
        .args([
            "--data-dir",
            data_dir.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .success();

    let (headers, _) = common::read_output(&data_dir.join("processed/correlation_data.csv"));
    assert_eq!(headers, ["region_id", "vehicles_per_capita"]);
}

#[test]
fn missing_data_directory_is_reported_on_stderr() {
    let workspace = TestWorkspace::new();
    let data_dir = workspace.path().join("nowhere");

    pipeline_cmd()
        .args(["--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("An error occurred"))
        .stdout(predicate::str::contains("Pipeline finished").not());
}

#[test]
fn invalid_config_is_reported() {
    let workspace = TestWorkspace::new();
    let data_dir = workspace.seed_raw_data();
    let config = workspace.write("bad.yml", "delimiter: \"ab\"\n");

    pipeline_cmd()
        .args([
            "--data-dir",
            data_dir.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("An error occurred"));
}

#[test]
fn unknown_argument_is_reported_like_other_failures() {
    pipeline_cmd()
        .arg("--no-such-flag")
        .assert()
        .success()
        .stderr(predicate::str::contains("An error occurred"))
        .stderr(predicate::str::contains("--no-such-flag"));
}

#[test]
fn help_is_printed_without_error() {
    pipeline_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--data-dir"))
        .stderr(predicate::str::contains("An error occurred").not());
}
