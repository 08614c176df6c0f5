use std::path::Path;

use crate::errors::DepsolverError;

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Read an input file that the user pointed us at.
///
/// Missing paths and directories are reported as [`DepsolverError::InputFile`]
/// rather than a bare I/O error so the CLI can name the offending file.
pub fn read_input_file(path: &Path) -> Result<String, DepsolverError> {
    if !path.is_file() {
        return Err(DepsolverError::InputFile {
            path: path.display().to_string(),
            message: "does not exist or is not a file".to_string(),
        });
    }
    tracing::debug!("reading {}", path.display());
    Ok(std::fs::read_to_string(path)?)
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) -> Result<(), DepsolverError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}
