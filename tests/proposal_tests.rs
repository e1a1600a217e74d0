use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::path::{Path, PathBuf};

use untitled_folder::analysis::{ContentHintProvider, DocumentHint, ImageHint, NameProposalEngine, NoHints};
use untitled_folder::{Category, FileSystemEntry, HintError, SilentReporter};

fn modified() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap()
}

fn file(path: &str) -> FileSystemEntry {
    FileSystemEntry {
        path: PathBuf::from(path),
        modified: modified(),
        size: 1024,
        is_dir: false,
    }
}

fn dir(path: &str) -> FileSystemEntry {
    FileSystemEntry {
        path: PathBuf::from(path),
        modified: modified(),
        size: 0,
        is_dir: true,
    }
}

/// Answers every request with the same canned hints.
struct FixedHints {
    image: Option<ImageHint>,
    title: Option<&'static str>,
}

impl ContentHintProvider for FixedHints {
    fn image_hint(&self, _path: &Path) -> Result<Option<ImageHint>, HintError> {
        Ok(self.image)
    }

    fn document_hint(&self, _path: &Path) -> Result<Option<DocumentHint>, HintError> {
        Ok(self.title.map(|title| DocumentHint {
            title: title.to_string(),
        }))
    }
}

struct BrokenHints;

impl ContentHintProvider for BrokenHints {
    fn image_hint(&self, _path: &Path) -> Result<Option<ImageHint>, HintError> {
        Err(HintError::Malformed("truncated EXIF block".to_string()))
    }

    fn document_hint(&self, path: &Path) -> Result<Option<DocumentHint>, HintError> {
        Err(HintError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("cannot open {}", path.display()),
        )))
    }
}

fn capture_hint() -> ImageHint {
    ImageHint {
        captured_at: NaiveDate::from_ymd_opt(2023, 6, 30)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap(),
    }
}

#[test]
fn test_untitled_text_file_falls_back_to_category_and_timestamp() {
    let engine = NameProposalEngine::new(&NoHints);
    let proposal = engine.propose(&file("/test/Untitled.txt"));

    assert_eq!(proposal.new_name(), "Document_2024-03-15_14-30.txt");
    assert_eq!(proposal.confidence(), 0.7);
    assert_eq!(proposal.category(), Category::Document);
    assert_eq!(proposal.original_path(), Path::new("/test/Untitled.txt"));
    assert_eq!(proposal.target_path(), PathBuf::from("/test/Document_2024-03-15_14-30.txt"));
}

#[test]
fn test_new_folder_gets_folder_name() {
    let engine = NameProposalEngine::new(&NoHints);
    let proposal = engine.propose(&dir("/test/New Folder"));

    assert_eq!(proposal.new_name(), "Folder_2024-03-15_14-30");
    assert_eq!(proposal.confidence(), 0.8);
    assert_eq!(proposal.category(), Category::Folder);
}

#[test]
fn test_folder_named_with_a_dot_keeps_it_in_the_category_match() {
    let engine = NameProposalEngine::new(&NoHints);
    let proposal = engine.propose(&dir("/test/new folder.old"));

    assert_eq!(proposal.new_name(), "Folder_2024-03-15_14-30");
}

#[test]
fn test_photo_with_capture_time() {
    let hints = FixedHints {
        image: Some(capture_hint()),
        title: None,
    };
    let engine = NameProposalEngine::new(&hints);
    let proposal = engine.propose(&file("/test/IMAGE 12.JPG"));

    assert_eq!(proposal.new_name(), "Photo_2023-06-30_08-15.jpg");
    assert_eq!(proposal.confidence(), 0.9);
    assert_eq!(proposal.category(), Category::Image);
}

#[test]
fn test_photo_without_capture_time_falls_back() {
    let engine = NameProposalEngine::new(&NoHints);
    let proposal = engine.propose(&file("/test/Screenshot 2.png"));

    assert_eq!(proposal.new_name(), "Screenshot_2024-03-15_14-30.png");
    assert_eq!(proposal.confidence(), 0.7);
}

#[test]
fn test_pdf_title_is_sanitized_into_name() {
    let hints = FixedHints {
        image: None,
        title: Some("  Q3: Budget/Plan  "),
    };
    let engine = NameProposalEngine::new(&hints);
    let proposal = engine.propose(&file("/test/untitled.pdf"));

    assert_eq!(proposal.new_name(), "Q3- Budget-Plan_2024-03-15_14-30.pdf");
    assert_eq!(proposal.confidence(), 0.85);
    assert_eq!(proposal.category(), Category::Document);
}

#[test]
fn test_blank_pdf_title_falls_back() {
    let hints = FixedHints {
        image: None,
        title: Some(" ... "),
    };
    let engine = NameProposalEngine::new(&hints);
    let proposal = engine.propose(&file("/test/untitled.pdf"));

    assert_eq!(proposal.new_name(), "Document_2024-03-15_14-30.pdf");
    assert_eq!(proposal.confidence(), 0.7);
}

#[test]
fn test_hint_errors_degrade_to_fallback() {
    let engine = NameProposalEngine::new(&BrokenHints);

    let photo = engine.propose(&file("/test/image.jpeg"));
    assert_eq!(photo.new_name(), "Image_2024-03-15_14-30.jpeg");
    assert_eq!(photo.confidence(), 0.7);

    let pdf = engine.propose(&file("/test/document.pdf"));
    assert_eq!(pdf.new_name(), "Document_2024-03-15_14-30.pdf");
    assert_eq!(pdf.confidence(), 0.7);
}

#[test]
fn test_file_without_extension_has_no_trailing_dot() {
    let engine = NameProposalEngine::new(&NoHints);
    let proposal = engine.propose(&file("/test/new file"));

    assert_eq!(proposal.new_name(), "File_2024-03-15_14-30");
    assert_eq!(proposal.category(), Category::File);
}

#[test]
fn test_hints_are_not_requested_for_other_types() {
    let hints = FixedHints {
        image: Some(capture_hint()),
        title: Some("Ignored"),
    };
    let engine = NameProposalEngine::new(&hints);
    let proposal = engine.propose(&file("/test/Untitled.docx"));

    assert_eq!(proposal.new_name(), "Document_2024-03-15_14-30.docx");
}

#[test]
fn test_propose_all_keeps_input_order() {
    let entries: Vec<FileSystemEntry> = (0..50)
        .map(|i| file(&format!("/test/Untitled {}.txt", i)))
        .collect();
    let engine = NameProposalEngine::new(&NoHints);
    let proposals = engine.propose_all(&entries, &SilentReporter);

    assert_eq!(proposals.len(), entries.len());
    for (entry, proposal) in entries.iter().zip(&proposals) {
        assert_eq!(proposal.original_path(), entry.path.as_path());
    }
}
