//! End-to-end tests for the crop-trainer binary

use crop_lib::artifact::ModelArtifact;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;
use std::process::Command;

fn trainer() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_crop-trainer"));
    cmd.env_remove("CROP_DATA").env_remove("CROP_MODEL_PATH");
    cmd
}

/// Three well-separated crops, 30 rows each
fn write_dataset(path: &Path) {
    let profiles = [
        ("rice", [80.0, 40.0, 40.0, 23.0, 82.0, 6.4, 230.0]),
        ("chickpea", [40.0, 67.0, 80.0, 18.5, 16.0, 7.3, 80.0]),
        ("coffee", [101.0, 28.0, 30.0, 25.5, 58.0, 6.8, 158.0]),
    ];
    let mut csv = String::from("N,P,K,temperature,humidity,ph,rainfall,label\n");
    for i in 0..30 {
        for (label, base) in &profiles {
            let jitter = ((i * 7) % 11) as f64 / 10.0;
            let values: Vec<String> = base.iter().map(|v| format!("{}", v + jitter)).collect();
            writeln!(csv, "{},{}", values.join(","), label).unwrap();
        }
    }
    std::fs::write(path, csv).unwrap();
}

/// Test that the trainer shows help
#[test]
fn test_cli_help() {
    let output = trainer()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Help should succeed");
    assert!(stdout.contains("--data"), "Should show data option");
    assert!(stdout.contains("--trees"), "Should show trees option");
    assert!(stdout.contains("--max-depth"), "Should show max-depth option");
}

/// Test that the trainer shows version
#[test]
fn test_cli_version() {
    let output = trainer()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Version should succeed");
    assert!(stdout.contains("crop-trainer"), "Should show binary name");
    assert!(stdout.contains("1.0.0"), "Should show version");
}

#[test]
fn test_missing_dataset_fails_without_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("crop_model.msgpack");

    let output = trainer()
        .arg("--data")
        .arg(dir.path().join("missing.csv"))
        .arg("--output")
        .arg(&model)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("dataset not found"));
    assert!(!model.exists());
}

#[test]
fn test_single_crop_fails_without_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("crop_data.csv");
    let model = dir.path().join("crop_model.msgpack");
    let mut csv = String::from("N,P,K,temperature,humidity,ph,rainfall,label\n");
    for i in 0..20 {
        writeln!(csv, "{},42,43,25.5,80,6.5,202.5,rice", 80 + i).unwrap();
    }
    std::fs::write(&data, csv).unwrap();

    let output = trainer()
        .arg("--data")
        .arg(&data)
        .arg("--output")
        .arg(&model)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(!model.exists());
}

#[test]
fn test_non_finite_value_fails_without_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("crop_data.csv");
    let model = dir.path().join("crop_model.msgpack");
    write_dataset(&data);

    let csv = std::fs::read_to_string(&data).unwrap();
    let mut lines: Vec<String> = csv.lines().map(str::to_string).collect();
    let (_, rest) = lines[3].split_once(',').unwrap();
    lines[3] = format!("NaN,{}", rest);
    std::fs::write(&data, lines.join("\n")).unwrap();

    let output = trainer()
        .arg("--data")
        .arg(&data)
        .arg("--output")
        .arg(&model)
        .args(["--format", "json"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr);
    assert!(stderr.contains("column N at line 4"));
    assert!(!model.exists());
}

#[test]
fn test_training_writes_artifact_and_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("crop_data.csv");
    let model = dir.path().join("models").join("crop_model.msgpack");
    write_dataset(&data);

    let output = trainer()
        .arg("--data")
        .arg(&data)
        .arg("--output")
        .arg(&model)
        .args(["--trees", "10", "--format", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total_samples"], 90);
    assert_eq!(summary["test_samples"], 18);
    assert_eq!(summary["train_samples"], 72);
    assert_eq!(summary["trees"], 10);

    let accuracy = summary["report"]["accuracy"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
    assert!(summary["sample_prediction"]["crop"].as_str().unwrap().len() > 0);

    let artifact = ModelArtifact::load(&model).unwrap();
    assert_eq!(artifact.forest.n_trees(), 10);
    assert_eq!(artifact.forest.classes(), ["chickpea", "coffee", "rice"]);
    assert!((artifact.held_out_accuracy - accuracy).abs() < 1e-12);
    assert_eq!(
        summary["artifact_bytes"].as_u64().unwrap(),
        std::fs::metadata(&model).unwrap().len()
    );
}

#[test]
fn test_table_report() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("crop_data.csv");
    let model = dir.path().join("crop_model.msgpack");
    write_dataset(&data);

    let output = trainer()
        .arg("--data")
        .arg(&data)
        .arg("--output")
        .arg(&model)
        .args(["--trees", "5"])
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Model Accuracy:"));
    assert!(stdout.contains("weighted avg"));
    assert!(stdout.contains("Sample prediction:"));
    assert!(model.exists());
}
