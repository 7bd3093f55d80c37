//! Recursive directory enumeration.
//!
//! Every non-directory entry below the root becomes a [`FileEntry`]. Entries
//! are sorted by file name within each directory so two runs over the same
//! tree visit files in the same order. Symlinks are not followed, and a
//! symlink pointing at a directory is treated as a directory, not a file.

use crate::candidate::FileEntry;
use crate::error::BatchError;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Walk `root` and classify every file found.
///
/// Blocking; call from `spawn_blocking` inside async code.
///
/// # Errors
/// The first unreadable directory aborts the walk with
/// [`BatchError::WalkFailed`].
pub fn discover(root: &Path) -> Result<Vec<FileEntry>, BatchError> {
    check_root(root)?;

    let mut entries = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir()) {
            continue;
        }
        let file = FileEntry::new(entry.into_path());
        debug!(
            "Found {} ({})",
            file.path.display(),
            match file.skip {
                None => "candidate".to_string(),
                Some(reason) => format!("{reason:?}"),
            }
        );
        entries.push(file);
    }
    Ok(entries)
}

/// Fail early with a specific error when the root is missing or not a directory.
pub fn check_root(root: &Path) -> Result<(), BatchError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BatchError::RootNotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BatchError::RootNotFound {
            path: root.to_path_buf(),
        }),
        Err(e) => Err(BatchError::WalkFailed {
            path: root.to_path_buf(),
            source: e,
        }),
    }
}
