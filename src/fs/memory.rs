use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::FileSystem;
use crate::error::ScanError;
use crate::model::FileSystemEntry;
use crate::platform;

#[derive(Debug, Clone)]
struct Node {
    is_dir: bool,
    modified: DateTime<Utc>,
    size: u64,
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    read_only: HashSet<PathBuf>,
    unreadable: HashSet<PathBuf>,
    failing_moves: HashMap<PathBuf, io::ErrorKind>,
    moves: Vec<(PathBuf, PathBuf)>,
}

/// In-memory tree with injectable failures.
///
/// Adding an entry creates its missing ancestors as directories. Every
/// successful `rename` is appended to a journal readable via [`moves`].
///
/// [`moves`]: MemoryFileSystem::moves
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: Mutex<State>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, modified: DateTime<Utc>, size: u64) {
        self.insert(path.as_ref(), Node {
            is_dir: false,
            modified,
            size,
        });
    }

    pub fn add_dir(&self, path: impl AsRef<Path>, modified: DateTime<Utc>) {
        self.insert(path.as_ref(), Node {
            is_dir: true,
            modified,
            size: 0,
        });
    }

    /// Entries can no longer be created in or removed from `dir`.
    pub fn deny_write(&self, dir: impl AsRef<Path>) {
        self.lock().read_only.insert(dir.as_ref().to_path_buf());
    }

    /// Listing `dir` fails with `PermissionDenied`.
    pub fn deny_read(&self, dir: impl AsRef<Path>) {
        self.lock().unreadable.insert(dir.as_ref().to_path_buf());
    }

    /// Any move whose source is `path` fails with an error of `kind`.
    pub fn fail_move_from(&self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        self.lock()
            .failing_moves
            .insert(path.as_ref().to_path_buf(), kind);
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.lock().nodes.contains_key(path.as_ref())
    }

    /// Successful moves, in the order they happened.
    pub fn moves(&self) -> Vec<(PathBuf, PathBuf)> {
        self.lock().moves.clone()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().nodes.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, path: &Path, node: Node) {
        let mut state = self.lock();
        let modified = node.modified;
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() || ancestor.parent().is_none() {
                break;
            }
            state
                .nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node {
                    is_dir: true,
                    modified,
                    size: 0,
                });
        }
        state.nodes.insert(path.to_path_buf(), node);
    }
}

impl State {
    fn is_dir(&self, path: &Path) -> bool {
        // Filesystem roots and the working directory always exist.
        path.as_os_str().is_empty()
            || path == Path::new(".")
            || path.parent().is_none()
            || self.nodes.get(path).is_some_and(|n| n.is_dir)
    }

    fn children(&self, dir: &Path) -> Vec<(PathBuf, Node)> {
        self.nodes
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .map(|(path, node)| (path.clone(), node.clone()))
            .collect()
    }

    fn visit(
        &self,
        dir: &Path,
        keep: &dyn Fn(&Path) -> bool,
        out: &mut Vec<FileSystemEntry>,
    ) -> Result<(), ScanError> {
        if self.unreadable.contains(dir) {
            return Err(ScanError::unreadable(
                dir,
                io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            ));
        }
        for (path, node) in self.children(dir) {
            if !keep(&path) {
                continue;
            }
            out.push(FileSystemEntry {
                path: path.clone(),
                modified: node.modified,
                size: node.size,
                is_dir: node.is_dir,
            });
            if node.is_dir {
                self.visit(&path, keep, out)?;
            }
        }
        Ok(())
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.lock().nodes.contains_key(path)
    }

    fn is_writable_dir(&self, path: &Path) -> bool {
        let dir = platform::effective_dir(path);
        let state = self.lock();
        state.is_dir(dir) && !state.read_only.contains(dir)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.lock();

        if let Some(kind) = state.failing_moves.get(from) {
            return Err(io::Error::new(
                *kind,
                format!("injected failure moving {}", from.display()),
            ));
        }
        for dir in [from.parent(), to.parent()].into_iter().flatten() {
            if state.read_only.contains(platform::effective_dir(dir)) {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("{} is not writable", dir.display()),
                ));
            }
        }
        if !state.nodes.contains_key(from) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", from.display()),
            ));
        }
        if state.nodes.contains_key(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
        if !to.parent().map_or(true, |p| state.is_dir(p)) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("parent of {} does not exist", to.display()),
            ));
        }

        // Directories carry their whole subtree along.
        let moved: Vec<PathBuf> = state
            .nodes
            .keys()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for old in moved {
            if let Some(node) = state.nodes.remove(&old) {
                let new = match old.strip_prefix(from) {
                    Ok(rest) if !rest.as_os_str().is_empty() => to.join(rest),
                    _ => to.to_path_buf(),
                };
                state.nodes.insert(new, node);
            }
        }
        state.moves.push((from.to_path_buf(), to.to_path_buf()));
        Ok(())
    }

    fn enumerate(
        &self,
        root: &Path,
        keep: &dyn Fn(&Path) -> bool,
    ) -> Result<Vec<FileSystemEntry>, ScanError> {
        let state = self.lock();
        if !state.is_dir(root) {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }
        let mut entries = Vec::new();
        state.visit(root, keep, &mut entries)?;
        Ok(entries)
    }
}
