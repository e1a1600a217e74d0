//! Narrow filesystem capability used by the scanner, planner and executor.
//!
//! `OsFileSystem` is the real binding. `MemoryFileSystem` keeps a tree in
//! memory and can be told to fail specific operations, which is how the
//! rollback paths are exercised deterministically.

mod memory;
mod os;

pub use memory::MemoryFileSystem;
pub use os::OsFileSystem;

use std::io;
use std::path::Path;

use crate::error::ScanError;
use crate::model::FileSystemEntry;

pub trait FileSystem: Send + Sync {
    /// True if anything (file, directory or dangling link) lives at `path`.
    fn exists(&self, path: &Path) -> bool;

    fn is_writable_dir(&self, path: &Path) -> bool;

    /// Moves `from` to `to`. Must fail with `AlreadyExists` rather than
    /// replace an existing destination.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Every entry below `root` (not `root` itself). An entry rejected by
    /// `keep` is skipped along with its whole subtree, and a skipped directory
    /// is never read.
    fn enumerate(
        &self,
        root: &Path,
        keep: &dyn Fn(&Path) -> bool,
    ) -> Result<Vec<FileSystemEntry>, ScanError>;
}
