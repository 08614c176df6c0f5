use depsolver_util::errors::DepsolverError;
use depsolver_util::fs::{ensure_dir, read_input_file, write_file};
use tempfile::TempDir;

#[test]
fn test_ensure_dir_creates_nested() {
    let tmp = TempDir::new().unwrap();
    let deep = tmp.path().join("x").join("y").join("z");
    assert!(!deep.exists());
    ensure_dir(&deep).unwrap();
    assert!(deep.is_dir());
}

#[test]
fn test_ensure_dir_idempotent() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("already");
    std::fs::create_dir(&dir).unwrap();
    ensure_dir(&dir).unwrap();
    assert!(dir.is_dir());
}

#[test]
fn test_read_input_file_missing() {
    let tmp = TempDir::new().unwrap();
    let err = read_input_file(&tmp.path().join("universe.json")).unwrap_err();
    assert!(matches!(err, DepsolverError::InputFile { .. }));
    assert!(err.to_string().contains("does not exist or is not a file"));
}

#[test]
fn test_read_input_file_rejects_directory() {
    let tmp = TempDir::new().unwrap();
    let err = read_input_file(tmp.path()).unwrap_err();
    assert!(matches!(err, DepsolverError::InputFile { .. }));
}

#[test]
fn test_write_then_read() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("out").join("env.json");
    write_file(&path, "{}").unwrap();
    assert_eq!(read_input_file(&path).unwrap(), "{}");
}
