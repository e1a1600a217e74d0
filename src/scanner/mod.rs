//! Finds entries whose names look like OS-assigned placeholders.

mod patterns;

pub use patterns::{is_hidden, PlaceholderMatcher, DEFAULT_PLACEHOLDER_PATTERNS};

use glob::Pattern;
use std::path::Path;
use tracing::{debug, error};

use crate::error::ScanError;
use crate::fs::FileSystem;
use crate::model::FileSystemEntry;

pub struct Scanner<'a> {
    fs: &'a dyn FileSystem,
    matcher: PlaceholderMatcher,
    ignore_patterns: Vec<Pattern>,
}

impl<'a> Scanner<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self {
            fs,
            matcher: PlaceholderMatcher::default(),
            ignore_patterns: Vec::new(),
        }
    }

    pub fn with_placeholders(mut self, patterns: &[String]) -> Self {
        self.matcher = PlaceholderMatcher::new(patterns);
        self
    }

    /// Entries matching any of these globs are skipped with their subtree.
    /// Invalid globs are logged and ignored.
    pub fn with_ignore_globs(mut self, globs: &[String]) -> Self {
        self.ignore_patterns = globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();
        self
    }

    /// Recursively collects every non-hidden placeholder-named entry under
    /// `root`. Order is unspecified. Any unreadable directory fails the scan.
    pub fn scan(&self, root: &Path) -> Result<Vec<FileSystemEntry>, ScanError> {
        let keep = |path: &Path| {
            !is_hidden(root, path)
                && !self
                    .ignore_patterns
                    .iter()
                    .any(|pattern| pattern.matches_path(path))
        };

        let entries = self.fs.enumerate(root, &keep)?;
        let total = entries.len();
        let matches: Vec<FileSystemEntry> = entries
            .into_iter()
            .filter(|entry| self.matcher.matches(&entry.file_name()))
            .collect();

        debug!(
            "Scanned {}: {} entries, {} placeholder names",
            root.display(),
            total,
            matches.len()
        );
        Ok(matches)
    }
}
