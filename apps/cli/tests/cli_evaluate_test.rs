//! Integration tests for `cropmask evaluate`.

mod common;

use common::{cropmask, split_train_output, workspace};
use predicates::prelude::*;

#[test]
fn test_evaluate_matches_training_metrics() {
    let ws = workspace();

    let trained = cropmask(ws.path()).arg("train").assert().success().get_output().stdout.clone();
    let (_, train_metrics) = split_train_output(&trained);

    let evaluated = cropmask(ws.path())
        .args(["evaluate", "--model_name", "East_Africa"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let eval_metrics: serde_json::Value = serde_json::from_slice(&evaluated).unwrap();

    assert_eq!(eval_metrics, train_metrics);
}

#[test]
fn test_evaluate_explicit_checkpoint_path() {
    let ws = workspace();
    cropmask(ws.path()).args(["train", "--model_name", "Kenya"]).assert().success();

    cropmask(ws.path())
        .args(["evaluate", "--checkpoint", "data/models/Kenya.ckpt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kenya_num_records"));
}

#[test]
fn test_evaluate_default_model_missing() {
    let ws = workspace();

    cropmask(ws.path())
        .arg("evaluate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("checkpoint not found"))
        .stderr(predicate::str::contains("Ethiopia_Tigray_2021.ckpt"));
}

#[test]
fn test_evaluate_corrupt_checkpoint() {
    let ws = workspace();
    let models = ws.path().join("data/models");
    std::fs::create_dir_all(&models).unwrap();
    std::fs::write(models.join("broken.ckpt"), b"\x00garbage").unwrap();

    cropmask(ws.path())
        .args(["evaluate", "--model_name", "broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt"));
}
