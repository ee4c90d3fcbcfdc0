//! Integration tests for `cropmask train`.

mod common;

use common::{cropmask, cropmask_without_workspace, populate, split_train_output, workspace};
use tempfile::TempDir;
use predicates::prelude::*;

#[test]
fn test_train_writes_checkpoint_and_prints_metrics() {
    let ws = workspace();

    let output = cropmask(ws.path()).arg("train").assert().success().get_output().stdout.clone();
    let (url, metrics) = split_train_output(&output);

    assert_eq!(url, "http://bboxfinder.com/#-12,28,15,48");
    // Kenya's 2020 label is outside the Feb 2021 - Feb 2022 window
    assert_eq!(metrics["num_records"], 5.0);
    assert_eq!(metrics["Kenya_num_records"], 3.0);
    assert_eq!(metrics["Rwanda_num_records"], 2.0);
    assert!(ws.path().join("data/models/East_Africa.ckpt").is_file());
}

#[test]
fn test_train_bbox_override() {
    let ws = workspace();

    let output = cropmask(ws.path())
        .args(["train", "--model_name", "north", "--min_lat", "-1.5"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let (url, metrics) = split_train_output(&output);

    assert_eq!(url, "http://bboxfinder.com/#-1.5,28,15,48");
    assert_eq!(metrics["Rwanda_num_records"], 0.0);
    assert!(ws.path().join("data/models/north.ckpt").is_file());
}

#[test]
fn test_train_accepts_model_parameters() {
    let ws = workspace();

    cropmask(ws.path())
        .args(["train", "--learning_rate", "0.5", "--max_epochs", "50", "--skip_era5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("num_records"));
}

#[test]
fn test_train_help_lists_model_parameters() {
    let ws = workspace();

    cropmask(ws.path())
        .args(["train", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Model parameters"))
        .stdout(predicate::str::contains("--learning_rate"))
        .stdout(predicate::str::contains("--skip_era5"));
}

#[test]
fn test_train_unknown_dataset_fails_without_checkpoint() {
    let ws = workspace();

    cropmask(ws.path())
        .args(["train", "--train_datasets", "Kenya,Atlantis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Atlantis"));
    assert!(!ws.path().join("data/models/East_Africa.ckpt").exists());
}

#[test]
fn test_train_unknown_region_fails() {
    let ws = workspace();

    cropmask(ws.path())
        .args(["train", "--region", "Atlantis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown region"));
}

#[test]
fn test_train_rejects_bad_model_parameter() {
    let ws = workspace();

    cropmask(ws.path())
        .args(["train", "--max_epochs", "many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_epochs"));
}

#[test]
fn test_train_rejects_inverted_bounds() {
    let ws = workspace();

    cropmask(ws.path())
        .args(["train", "--min_lat", "10", "--max_lat", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid training configuration"));
}

#[test]
fn test_models_dir_from_environment() {
    let ws = workspace();

    cropmask(ws.path()).env("CROPMASK_MODELS_DIR", "out/ckpts").arg("train").assert().success();
    assert!(ws.path().join("out/ckpts/East_Africa.ckpt").is_file());
}

#[test]
fn test_train_without_workspace_uses_cropmask_home() {
    let home = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    populate(&home.path().join(".cropmask"));
    // A catalog in the caller's directory must not be picked up
    std::fs::write(elsewhere.path().join("catalog.toml"), "not toml [").unwrap();

    cropmask_without_workspace(home.path(), elsewhere.path())
        .args(["train", "--model_name", "homed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("num_records"));

    assert!(home.path().join(".cropmask/data/models/homed.ckpt").is_file());
    assert!(!elsewhere.path().join("data").exists());

    cropmask_without_workspace(home.path(), elsewhere.path())
        .args(["evaluate", "--model_name", "homed"])
        .assert()
        .success();
}
