//! Atomic write of the generated program.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::EmitError;

/// Write `text` to `path` through a temporary file in the same directory,
/// renamed into place only once fully written. An existing file is replaced
/// whole or left untouched.
pub fn write_atomic(path: &Path, text: &str) -> Result<(), EmitError> {
    let fail = |message: String| EmitError::Write {
        path: path.display().to_string(),
        message,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| fail(e.to_string()))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| fail(e.to_string()))?;
    tmp.write_all(text.as_bytes())
        .map_err(|e| fail(e.to_string()))?;
    tmp.as_file().sync_all().map_err(|e| fail(e.to_string()))?;
    tmp.persist(path).map_err(|e| fail(e.error.to_string()))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "output written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_parent_and_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated").join("form.py");
        write_atomic(&path, "first\n").unwrap();
        write_atomic(&path, "second\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_unwritable_destination_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let err = write_atomic(&blocker.join("form.py"), "text").unwrap_err();
        assert_eq!(err.kind(), "write");
    }
}
