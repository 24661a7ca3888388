//! Atomic file placement.
//!
//! Every durable artifact is written to a temp file in the destination
//! directory and renamed into place, so a kill at any point leaves either
//! the old state or the new state, never a half-written file.

use crate::Result;
use std::io::Write;
use std::path::Path;

/// Write `contents` to `path` via temp file + rename in the same directory.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_places_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sub/file.aicf");

        write_atomic(&path, "line\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line\n");
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.aicf");

        write_atomic(&path, "old").unwrap();
        write_atomic(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_no_temp_litter() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.aicf");
        write_atomic(&path, "x").unwrap();

        let entries: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries, vec!["file.aicf"]);
    }
}
