use chrono::{DateTime, NaiveDateTime, Utc};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

use super::hints::ContentHintProvider;
use crate::model::{Category, FileSystemEntry, RenameProposal};
use crate::progress::ProgressReporter;

/// `YYYY-MM-DD_hh-mm`, always rendered in UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";
pub const MAX_HINT_CHARS: usize = 80;

pub const DIRECTORY_CONFIDENCE: f64 = 0.8;
pub const PHOTO_CONFIDENCE: f64 = 0.9;
pub const TITLED_DOCUMENT_CONFIDENCE: f64 = 0.85;
pub const FALLBACK_CONFIDENCE: f64 = 0.7;

// First match wins.
const CATEGORY_RULES: &[(&str, Category)] = &[
    ("untitled", Category::Document),
    ("new folder", Category::Folder),
    ("new file", Category::File),
    ("screenshot", Category::Screenshot),
    ("image", Category::Image),
    ("document", Category::Document),
];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic"];

pub fn categorize(name: &str) -> Category {
    let name = name.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(pattern, _)| name.contains(pattern))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Document)
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

fn format_capture_time(captured_at: &NaiveDateTime) -> String {
    captured_at.format(TIMESTAMP_FORMAT).to_string()
}

/// Makes free text usable as a file name: separators and control characters
/// become `-`, surrounding whitespace and dots are trimmed and the result is
/// capped at [`MAX_HINT_CHARS`]. `None` if nothing usable remains.
pub fn sanitize_hint(text: &str) -> Option<String> {
    let replaced: String = text
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == ':' || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.' || c == '-');
    let capped: String = trimmed.chars().take(MAX_HINT_CHARS).collect();
    let capped = capped.trim_end();
    (!capped.is_empty()).then(|| capped.to_string())
}

/// Turns scanned entries into rename proposals. Never fails: a hint that
/// cannot be read simply isn't used.
pub struct NameProposalEngine<'a> {
    hints: &'a dyn ContentHintProvider,
}

impl<'a> NameProposalEngine<'a> {
    pub fn new(hints: &'a dyn ContentHintProvider) -> Self {
        Self { hints }
    }

    pub fn propose(&self, entry: &FileSystemEntry) -> RenameProposal {
        let timestamp = format_timestamp(&entry.modified);

        if entry.is_dir {
            let category = categorize(&entry.file_name());
            return build(
                entry,
                format!("{}_{}", category, timestamp),
                DIRECTORY_CONFIDENCE,
                category,
            );
        }

        let stem = entry
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let category = categorize(&stem);
        let extension = entry
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        let with_extension = |base: String| match &extension {
            Some(ext) => format!("{}.{}", base, ext),
            None => base,
        };
        let fallback = format!("{}_{}", category, timestamp);

        match extension.as_deref() {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => {
                match self.image_capture_time(&entry.path) {
                    Some(captured_at) => build(
                        entry,
                        with_extension(format!("Photo_{}", format_capture_time(&captured_at))),
                        PHOTO_CONFIDENCE,
                        category,
                    ),
                    None => build(entry, with_extension(fallback), FALLBACK_CONFIDENCE, category),
                }
            }
            Some("pdf") => match self.document_title(&entry.path) {
                Some(title) => build(
                    entry,
                    with_extension(format!("{}_{}", title, timestamp)),
                    TITLED_DOCUMENT_CONFIDENCE,
                    category,
                ),
                None => build(entry, with_extension(fallback), FALLBACK_CONFIDENCE, category),
            },
            _ => build(entry, with_extension(fallback), FALLBACK_CONFIDENCE, category),
        }
    }

    /// Proposals for every entry, computed in parallel, returned in input order.
    pub fn propose_all(
        &self,
        entries: &[FileSystemEntry],
        reporter: &dyn ProgressReporter,
    ) -> Vec<RenameProposal> {
        let total = entries.len();
        let analyzed = AtomicUsize::new(0);
        reporter.on_analyze_start(total);

        entries
            .par_iter()
            .map(|entry| {
                let proposal = self.propose(entry);
                let done = analyzed.fetch_add(1, Ordering::Relaxed) + 1;
                reporter.on_analyze_progress(done, total);
                proposal
            })
            .collect()
    }

    fn image_capture_time(&self, path: &Path) -> Option<NaiveDateTime> {
        match self.hints.image_hint(path) {
            Ok(hint) => hint.map(|h| h.captured_at),
            Err(e) => {
                debug!("No image hint for {}: {}", path.display(), e);
                None
            }
        }
    }

    fn document_title(&self, path: &Path) -> Option<String> {
        match self.hints.document_hint(path) {
            Ok(hint) => hint.and_then(|h| sanitize_hint(&h.title)),
            Err(e) => {
                debug!("No document hint for {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn build(
    entry: &FileSystemEntry,
    new_name: String,
    confidence: f64,
    category: Category,
) -> RenameProposal {
    RenameProposal::generated(entry.path.clone(), new_name, confidence, category)
}
