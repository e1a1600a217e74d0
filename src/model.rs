use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{self, Path, PathBuf};

use crate::error::Error;

/// Snapshot of one filesystem entry, taken when the tree was scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemEntry {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    pub size: u64,
    pub is_dir: bool,
}

impl FileSystemEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Semantic label used as the prefix of a generated name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Document,
    Folder,
    File,
    Screenshot,
    Image,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Document => "Document",
            Category::Folder => "Folder",
            Category::File => "File",
            Category::Screenshot => "Screenshot",
            Category::Image => "Image",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A suggested new name for one entry. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameProposal {
    original_path: PathBuf,
    new_name: String,
    confidence: f64,
    category: Category,
}

impl RenameProposal {
    /// Builds a proposal, rejecting empty names, names containing a path
    /// separator, and confidences outside `[0, 1]`.
    pub fn new(
        original_path: impl Into<PathBuf>,
        new_name: impl Into<String>,
        confidence: f64,
        category: Category,
    ) -> Result<Self, Error> {
        let new_name = new_name.into();
        if new_name.is_empty() || new_name == "." || new_name == ".." {
            return Err(Error::InvalidProposal(format!(
                "'{}' is not a usable file name",
                new_name
            )));
        }
        if new_name.chars().any(|c| c == '/' || path::is_separator(c)) {
            return Err(Error::InvalidProposal(format!(
                "'{}' contains a path separator",
                new_name
            )));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::InvalidProposal(format!(
                "confidence {} is outside [0, 1]",
                confidence
            )));
        }

        Ok(Self {
            original_path: original_path.into(),
            new_name,
            confidence,
            category,
        })
    }

    /// For names assembled from category labels, timestamps, sanitized hints
    /// and an existing extension, which cannot violate the invariants.
    pub(crate) fn generated(
        original_path: PathBuf,
        new_name: String,
        confidence: f64,
        category: Category,
    ) -> Self {
        debug_assert!(!new_name.is_empty() && !new_name.contains('/'));
        debug_assert!((0.0..=1.0).contains(&confidence));
        Self {
            original_path,
            new_name,
            confidence,
            category,
        }
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn new_name(&self) -> &str {
        &self.new_name
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// The sibling of the original path carrying the new name.
    pub fn target_path(&self) -> PathBuf {
        self.original_path.with_file_name(&self.new_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_path_is_sibling() {
        let proposal =
            RenameProposal::new("/test/Untitled.txt", "Notes.txt", 0.7, Category::Document)
                .unwrap();
        assert_eq!(proposal.target_path(), PathBuf::from("/test/Notes.txt"));
    }

    #[test]
    fn test_rejects_separator_in_name() {
        let result = RenameProposal::new("/test/a.txt", "sub/b.txt", 0.7, Category::File);
        assert!(matches!(result, Err(Error::InvalidProposal(_))));
    }

    #[test]
    fn test_rejects_empty_name_and_bad_confidence() {
        assert!(RenameProposal::new("/test/a.txt", "", 0.7, Category::File).is_err());
        assert!(RenameProposal::new("/test/a.txt", "b.txt", 1.5, Category::File).is_err());
        assert!(RenameProposal::new("/test/a.txt", "b.txt", f64::NAN, Category::File).is_err());
    }
}
