//! Whole-file text I/O for the rewriting utilities.
//!
//! Reads are strict UTF-8 with no lossy fallback. Writes go to a temporary
//! file in the target's directory which is renamed over the target only once
//! it has been fully written and flushed, so a failed write leaves the
//! original untouched.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::FileError;

/// Read the entire file at `path` as UTF-8.
pub fn read_utf8(path: &Path) -> Result<String, FileError> {
    let bytes = fs::read(path).map_err(|e| FileError::from_read(path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "read file");

    String::from_utf8(bytes).map_err(|e| FileError::Encoding {
        path: path.display().to_string(),
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

/// Replace the contents of `path` with `contents`.
///
/// Symlinks are followed: the file the link points at is replaced and the
/// link itself stays in place. The temporary file inherits the permissions
/// of the file it replaces. If any step fails the temporary file is dropped
/// (and deleted) and the original file is left as it was.
pub fn replace_atomically(path: &Path, contents: &str) -> Result<(), FileError> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FileError::from_write(path, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| FileError::from_write(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| FileError::from_write(path, e))?;

    if let Ok(meta) = fs::metadata(&target) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| FileError::from_write(path, e))?;
    }

    tmp.persist(&target).map_err(|e| FileError::Persist {
        path: path.display().to_string(),
        source: e.error,
    })?;

    debug!(
        path = %path.display(),
        target = %target.display(),
        bytes = contents.len(),
        "replaced file"
    );
    Ok(())
}
