use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

use super::FileSystem;
use crate::error::ScanError;
use crate::model::FileSystemEntry;
use crate::platform;

/// The real filesystem. Symlinks are reported as themselves, never followed.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn is_writable_dir(&self, path: &Path) -> bool {
        let dir = platform::effective_dir(path);
        match fs::metadata(dir) {
            Ok(metadata) if metadata.is_dir() => platform::can_write_dir(dir, &metadata),
            _ => false,
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        // fs::rename silently replaces an existing file on unix.
        if fs::symlink_metadata(to).is_ok() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
        fs::rename(from, to)
    }

    fn enumerate(
        &self,
        root: &Path,
        keep: &dyn Fn(&Path) -> bool,
    ) -> Result<Vec<FileSystemEntry>, ScanError> {
        let root_metadata =
            fs::metadata(root).map_err(|err| ScanError::unreadable(root, err))?;
        if !root_metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut entries = Vec::new();
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || keep(entry.path()));

        for entry_result in walker {
            let entry = entry_result.map_err(|err| walk_error(root, err))?;
            let metadata = entry
                .metadata()
                .map_err(|err| walk_error(entry.path(), err))?;
            let modified = metadata
                .modified()
                .map_err(|err| ScanError::unreadable(entry.path(), err))?;

            entries.push(FileSystemEntry {
                path: entry.path().to_path_buf(),
                modified: DateTime::<Utc>::from(modified),
                size: metadata.len(),
                is_dir: metadata.is_dir(),
            });
        }

        Ok(entries)
    }
}

fn walk_error(fallback: &Path, err: walkdir::Error) -> ScanError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf());
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
    ScanError::Unreadable { path, source }
}
