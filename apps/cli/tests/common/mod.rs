//! Shared fixtures for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

pub const CATALOG: &str = r#"
[defaults]
region = "East_Africa"
model_name = "East_Africa"
train_datasets = ["Kenya", "Uganda"]
eval_datasets = ["Kenya", "Rwanda"]

[regions.East_Africa]
min_lat = -12.0
max_lat = 15.0
min_lon = 28.0
max_lon = 48.0

[datasets.Kenya]
start_date = "2019-01-01"
end_date = "2022-12-31"
footprint = { min_lat = -4.7, max_lat = 4.62, min_lon = 33.9, max_lon = 41.89 }

[datasets.Uganda]
start_date = "2019-01-01"
end_date = "2022-12-31"
footprint = { min_lat = -1.5, max_lat = 4.3, min_lon = 29.5, max_lon = 35.0 }

[datasets.Rwanda]
start_date = "2019-01-01"
end_date = "2022-12-31"
footprint = { min_lat = -2.9, max_lat = -1.0, min_lon = 28.8, max_lon = 30.9 }
path = "rwanda/labels.jsonl"
"#;

const KENYA: &str = r#"{"lat":0.5,"lon":36.0,"date":"2021-05-01","is_crop":true,"features":{"s2":[0.9,0.2],"era5":[1.0]}}
{"lat":0.6,"lon":36.1,"date":"2021-07-01","is_crop":false,"features":{"s2":[0.1,0.3],"era5":[0.4]}}
{"lat":0.7,"lon":36.2,"date":"2021-09-01","is_crop":true,"features":{"s2":[0.8,0.1],"era5":[0.9]}}
{"lat":0.8,"lon":36.3,"date":"2020-09-01","is_crop":true,"features":{"s2":[0.7,0.1],"era5":[0.8]}}
"#;

const UGANDA: &str = r#"{"lat":1.0,"lon":32.0,"date":"2021-04-01","is_crop":false,"features":{"s2":[0.2,0.6],"era5":[0.3]}}
{"lat":1.1,"lon":32.1,"date":"2021-06-01","is_crop":true,"features":{"s2":[0.7,0.2],"era5":[0.8]}}
"#;

const RWANDA: &str = r#"{"lat":-2.0,"lon":30.0,"date":"2021-04-01","is_crop":true,"features":{"s2":[0.6,0.2],"era5":[0.7]}}
{"lat":-2.1,"lon":30.1,"date":"2021-08-01","is_crop":false,"features":{"s2":[0.3,0.5],"era5":[0.2]}}
"#;

/// A workspace with `catalog.toml` and label files under `data/datasets`.
pub fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    populate(temp.path());
    temp
}

/// Write the catalog and label files into `root`.
pub fn populate(root: &Path) {
    std::fs::create_dir_all(root).unwrap();
    std::fs::write(root.join("catalog.toml"), CATALOG).unwrap();

    let datasets = root.join("data/datasets");
    std::fs::create_dir_all(datasets.join("rwanda")).unwrap();
    std::fs::write(datasets.join("Kenya.jsonl"), KENYA).unwrap();
    std::fs::write(datasets.join("Uganda.jsonl"), UGANDA).unwrap();
    std::fs::write(datasets.join("rwanda/labels.jsonl"), RWANDA).unwrap();
}

/// `cropmask -w <workspace>` isolated from the caller's config and environment.
pub fn cropmask(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cropmask").unwrap();
    cmd.env("HOME", workspace)
        .env_remove("CROPMASK_WORKSPACE")
        .env_remove("CROPMASK_MODELS_DIR")
        .env_remove("CROPMASK_DATASETS_DIR")
        .arg("-w")
        .arg(workspace);
    cmd
}

/// `cropmask` with `home` as HOME, no `-w`, started from `cwd`.
pub fn cropmask_without_workspace(home: &Path, cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cropmask").unwrap();
    cmd.env("HOME", home)
        .env_remove("CROPMASK_WORKSPACE")
        .env_remove("CROPMASK_MODELS_DIR")
        .env_remove("CROPMASK_DATASETS_DIR")
        .current_dir(cwd);
    cmd
}

/// Split `train` stdout into the bbox URL line and the metrics JSON.
pub fn split_train_output(stdout: &[u8]) -> (String, serde_json::Value) {
    let text = String::from_utf8(stdout.to_vec()).unwrap();
    let (url, json) = text.split_once('\n').unwrap();
    (url.to_string(), serde_json::from_str(json).unwrap())
}
