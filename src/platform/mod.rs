use std::fs::Metadata;
use std::path::Path;

/// Whether the current process may create and remove entries in `dir`.
#[cfg(unix)]
pub fn can_write_dir(dir: &Path, _metadata: &Metadata) -> bool {
    use rustix::fs::{access, Access};

    access(dir, Access::WRITE_OK).is_ok()
}

#[cfg(not(unix))]
pub fn can_write_dir(_dir: &Path, metadata: &Metadata) -> bool {
    !metadata.permissions().readonly()
}

/// An empty parent (a bare file name) means the working directory.
pub fn effective_dir(dir: &Path) -> &Path {
    if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    }
}
