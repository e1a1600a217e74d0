use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use super::sniff::{exif, pdf};
use crate::error::HintError;

/// When a photo was taken, according to its embedded metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHint {
    pub captured_at: NaiveDateTime,
}

/// A document's title, or the first line of text on its first page when it
/// has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHint {
    pub title: String,
}

/// Best-effort content inspection for a single entry.
///
/// Errors are advisory: the proposal engine treats them exactly like `Ok(None)`.
pub trait ContentHintProvider: Send + Sync {
    fn image_hint(&self, path: &Path) -> Result<Option<ImageHint>, HintError>;
    fn document_hint(&self, path: &Path) -> Result<Option<DocumentHint>, HintError>;
}

/// Never finds anything. Names fall back to category and timestamp.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHints;

impl ContentHintProvider for NoHints {
    fn image_hint(&self, _path: &Path) -> Result<Option<ImageHint>, HintError> {
        Ok(None)
    }

    fn document_hint(&self, _path: &Path) -> Result<Option<DocumentHint>, HintError> {
        Ok(None)
    }
}

const IMAGE_HEAD_BYTES: u64 = 256 * 1024;
const PDF_WHOLE_FILE_LIMIT: u64 = 8 * 1024 * 1024;
const PDF_WINDOW_BYTES: u64 = 1024 * 1024;

/// Reads the first bytes of images for EXIF `DateTimeOriginal`, and PDFs for
/// their Info-dictionary `/Title` or else their first line of page text.
#[derive(Debug, Default, Clone, Copy)]
pub struct SniffingHintProvider;

impl SniffingHintProvider {
    fn read_head(path: &Path, limit: u64) -> Result<Vec<u8>, HintError> {
        let mut buf = Vec::new();
        File::open(path)?.take(limit).read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Small PDFs are read whole; large ones as head + tail, where the
    /// trailer and Info dictionary usually sit.
    fn read_pdf(path: &Path) -> Result<Vec<u8>, HintError> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();
        if len <= PDF_WHOLE_FILE_LIMIT {
            let mut buf = Vec::with_capacity(len as usize);
            file.read_to_end(&mut buf)?;
            return Ok(buf);
        }

        let mut buf = Vec::new();
        (&mut file).take(PDF_WINDOW_BYTES).read_to_end(&mut buf)?;
        file.seek(SeekFrom::End(-(PDF_WINDOW_BYTES as i64)))?;
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl ContentHintProvider for SniffingHintProvider {
    fn image_hint(&self, path: &Path) -> Result<Option<ImageHint>, HintError> {
        let head = Self::read_head(path, IMAGE_HEAD_BYTES)?;
        Ok(exif::capture_time(&head).map(|captured_at| ImageHint { captured_at }))
    }

    fn document_hint(&self, path: &Path) -> Result<Option<DocumentHint>, HintError> {
        let data = Self::read_pdf(path)?;
        if !data.starts_with(b"%PDF") {
            return Err(HintError::Malformed(format!(
                "{} has no PDF header",
                path.display()
            )));
        }
        Ok(pdf::title(&data)
            .or_else(|| pdf::first_text_line(&data))
            .map(|title| DocumentHint { title }))
    }
}
