use depsolver_util::errors::DepsolverError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = DepsolverError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_malformed_version_display() {
    let err = DepsolverError::MalformedVersion {
        version: "1.x".to_string(),
    };
    assert_eq!(err.to_string(), "Malformed version: '1.x'");
}

#[test]
fn test_malformed_constraint_display() {
    let err = DepsolverError::MalformedConstraint {
        constraint: "=> 1.0".to_string(),
    };
    assert_eq!(err.to_string(), "Malformed version constraint: '=> 1.0'");
}

#[test]
fn test_malformed_run_list_display() {
    let err = DepsolverError::MalformedRunList {
        item: "role[base]".to_string(),
        reason: "roles cannot be expanded locally".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Malformed run list item: 'role[base]': roles cannot be expanded locally"
    );
}

#[test]
fn test_input_file_display() {
    let err = DepsolverError::InputFile {
        path: "env.json".to_string(),
        message: "does not contain an environment name.".to_string(),
    };
    assert_eq!(err.to_string(), "env.json does not contain an environment name.");
}

#[test]
fn test_config_error_display() {
    let err = DepsolverError::Config {
        message: "bad toml".to_string(),
    };
    assert_eq!(err.to_string(), "Configuration error: bad toml");
}

#[test]
fn test_generic_error_display() {
    let err = DepsolverError::Generic {
        message: "something broke".to_string(),
    };
    assert_eq!(err.to_string(), "something broke");
}

#[test]
fn test_io_error_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: DepsolverError = io_err.into();
    assert!(matches!(err, DepsolverError::Io(_)));
}
