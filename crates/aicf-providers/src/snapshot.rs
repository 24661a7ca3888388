//! Snapshot-copy discipline for lock-holding stores.
//!
//! LevelDB and SQLite stores may be held open by the owning application.
//! Readers copy the store to a temporary location first and only ever open
//! the copy; the live path is never written, never even opened. The
//! temporary directory is removed on every exit path when the [`Snapshot`]
//! drops.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Cap on opening a snapshotted database.
pub const OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// A temporary copy of a foreign store.
pub struct Snapshot {
    dir: TempDir,
    path: PathBuf,
}

impl Snapshot {
    /// Copy an entire store directory (LevelDB layout) into a temp dir.
    pub fn of_dir(store_dir: &Path) -> Result<Self> {
        let dir = TempDir::new()?;
        let dest = dir.path().join("store");
        copy_dir(store_dir, &dest)?;
        Ok(Self { dir, path: dest })
    }

    /// Copy a single store file (SQLite) plus any WAL/SHM siblings.
    pub fn of_file(store_file: &Path) -> Result<Self> {
        let dir = TempDir::new()?;
        let file_name = store_file
            .file_name()
            .ok_or_else(|| Error::Unavailable(format!("not a file: {}", store_file.display())))?;
        let dest = dir.path().join(file_name);
        std::fs::copy(store_file, &dest)?;

        for suffix in ["-wal", "-shm"] {
            let mut sibling = store_file.as_os_str().to_os_string();
            sibling.push(suffix);
            let sibling = PathBuf::from(sibling);
            if sibling.exists() {
                let mut dest_sibling = dest.as_os_str().to_os_string();
                dest_sibling.push(suffix);
                std::fs::copy(&sibling, PathBuf::from(dest_sibling))?;
            }
        }

        Ok(Self { dir, path: dest })
    }

    /// Path of the copied store inside the temp dir.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the temp dir alive explicitly (documents the borrow in callers).
    pub fn tempdir(&self) -> &TempDir {
        &self.dir
    }
}

fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .expect("walkdir yields children of src");
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Run a blocking store open on a worker thread, bounded by [`OPEN_TIMEOUT`].
///
/// On timeout the result is [`Error::Locked`] and the worker is abandoned;
/// whatever it later produces is dropped with the channel.
pub fn open_with_timeout<T, F>(label: &str, open: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name(format!("open-{}", label))
        .spawn(move || {
            let _ = tx.send(open());
        })?;

    match rx.recv_timeout(OPEN_TIMEOUT) {
        Ok(result) => result,
        Err(_) => Err(Error::Locked(format!("open timed out: {}", label))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_copies_nested_dir() {
        let src = TempDir::new().unwrap();
        std::fs::create_dir_all(src.path().join("sub")).unwrap();
        std::fs::write(src.path().join("CURRENT"), b"MANIFEST-000001\n").unwrap();
        std::fs::write(src.path().join("sub/000003.log"), b"data").unwrap();

        let snapshot = Snapshot::of_dir(src.path()).unwrap();
        assert!(snapshot.path().join("CURRENT").exists());
        assert!(snapshot.path().join("sub/000003.log").exists());
    }

    #[test]
    fn test_snapshot_dir_removed_on_drop() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("CURRENT"), b"x").unwrap();

        let snapshot = Snapshot::of_dir(src.path()).unwrap();
        let copied = snapshot.path().to_path_buf();
        assert!(copied.exists());
        drop(snapshot);
        assert!(!copied.exists());
    }

    #[test]
    fn test_snapshot_of_file_copies_wal() {
        let src = TempDir::new().unwrap();
        let db = src.path().join("state.sqlite");
        std::fs::write(&db, b"main").unwrap();
        std::fs::write(src.path().join("state.sqlite-wal"), b"wal").unwrap();

        let snapshot = Snapshot::of_file(&db).unwrap();
        assert!(snapshot.path().exists());
        let mut wal = snapshot.path().as_os_str().to_os_string();
        wal.push("-wal");
        assert!(PathBuf::from(wal).exists());
    }

    #[test]
    fn test_open_with_timeout_passes_result() {
        let value = open_with_timeout("fast", || Ok(42usize)).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_open_with_timeout_propagates_error() {
        let result: Result<()> =
            open_with_timeout("failing", || Err(Error::LevelDb("broken".to_string())));
        assert!(matches!(result, Err(Error::LevelDb(_))));
    }
}
