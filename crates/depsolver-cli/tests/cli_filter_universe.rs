use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn depsolver_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("depsolver").unwrap();
    cmd.env("HOME", home)
        .env("NO_GRAPHICS", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn write_inputs(dir: &Path) {
    fs::write(
        dir.join("universe.json"),
        r#"{"universe": {
            "nginx": {
                "1.0.0": {"dependencies": {"apt": ">= 1.0"}},
                "2.0.0": {"dependencies": {"apt": ">= 2.0"}}
            },
            "apt": {"1.0.0": {"dependencies": {}}}
        }}"#,
    )
    .unwrap();
    fs::write(
        dir.join("env.json"),
        r#"{"environment_name": "staging", "environment_constraints": {"nginx": "~> 1.0"}}"#,
    )
    .unwrap();
}

fn filtered_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("filtered-universe-"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_filter_universe_writes_hashed_file() {
    let tmp = TempDir::new().unwrap();
    write_inputs(tmp.path());
    let out = tmp.path().join("out");

    depsolver_cmd(tmp.path())
        .current_dir(tmp.path())
        .args([
            "filter-universe",
            "--universe",
            "universe.json",
            "--env-constraints",
            "env.json",
            "--output-dir",
        ])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Kept 2 versions of 2 cookbooks"))
        .stdout(predicate::str::contains("Filtered cookbook universe saved to"));

    let files = filtered_files(&out);
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with(".txt"));

    let contents = fs::read_to_string(out.join(&files[0])).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let nginx = json["universe"]["nginx"].as_object().unwrap();
    assert_eq!(nginx.keys().collect::<Vec<_>>(), vec!["1.0.0"]);
    assert!(json["universe"]["apt"]["1.0.0"].is_object());
    assert!(files[0].contains(&depsolver_util::hash::sha1_bytes(contents.as_bytes())));
}

#[test]
fn test_filter_universe_defaults_to_config_dir() {
    let tmp = TempDir::new().unwrap();
    write_inputs(tmp.path());
    let config_dir = tmp.path().join(".depsolver");
    fs::create_dir_all(&config_dir).unwrap();
    let target = tmp.path().join("filtered");
    fs::write(
        config_dir.join("config.toml"),
        format!("[output]\ndir = {:?}\n", target.display().to_string()),
    )
    .unwrap();

    depsolver_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["filter-universe", "-u", "universe.json", "-e", "env.json"])
        .assert()
        .success();

    assert_eq!(filtered_files(&target).len(), 1);
}

#[test]
fn test_filter_universe_requires_environment() {
    let tmp = TempDir::new().unwrap();
    write_inputs(tmp.path());

    depsolver_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["filter-universe", "-u", "universe.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--env-constraints"));
}

#[test]
fn test_filter_universe_rejects_bad_universe() {
    let tmp = TempDir::new().unwrap();
    write_inputs(tmp.path());
    fs::write(tmp.path().join("universe.json"), r#"{"cookbooks": {}}"#).unwrap();

    depsolver_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["filter-universe", "-u", "universe.json", "-e", "env.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not contain a cookbook universe Hash."));
}
