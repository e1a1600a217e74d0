use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tempfile::tempdir;

use untitled_folder::analysis::NoHints;
use untitled_folder::rename::Verdict;
use untitled_folder::{AppConfig, Category, RenameEngine, SilentReporter};

const TITLED_PDF: &str = "%PDF-1.4\n\
    1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\
    2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n\
    3 0 obj\n<< /Title (Quarterly Report) /Producer (test) >>\nendobj\n\
    trailer\n<< /Size 4 /Root 1 0 R /Info 3 0 R >>\n%%EOF\n";

/// Layout:
///   root/
///     Untitled.txt
///     untitled.pdf        (Info title "Quarterly Report")
///     notes.txt           (not a placeholder)
///     New Folder/
///       image.png         (no EXIF, falls back)
///     .hidden/
///       Untitled.txt      (skipped)
fn create_test_tree(root: &Path) {
    fs::create_dir_all(root.join("New Folder")).unwrap();
    fs::create_dir_all(root.join(".hidden")).unwrap();
    fs::write(root.join("Untitled.txt"), "draft").unwrap();
    fs::write(root.join("untitled.pdf"), TITLED_PDF).unwrap();
    fs::write(root.join("notes.txt"), "keep").unwrap();
    fs::write(root.join("New Folder").join("image.png"), [0x89, b'P', b'N', b'G']).unwrap();
    fs::write(root.join(".hidden").join("Untitled.txt"), "secret").unwrap();
}

fn config_for(root: &Path) -> AppConfig {
    AppConfig {
        root_paths: vec![root.to_string_lossy().into_owned()],
        ..AppConfig::default()
    }
}

fn set_modified(path: &Path, when: DateTime<Utc>) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::from(when)).unwrap();
}

fn file_count(dir: &Path) -> usize {
    let mut count = 0;
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                count += file_count(&path);
            } else if path.is_file() {
                count += 1;
            }
        }
    }
    count
}

#[test]
fn test_full_pipeline() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("inbox");
    create_test_tree(&root);
    let files_before = file_count(&root);

    let engine = RenameEngine::new(config_for(&root));

    let scan = engine.scan(&SilentReporter).unwrap();
    assert_eq!(scan.roots, vec![root.clone()]);
    assert_eq!(scan.entries.len(), 4, "entries: {:?}", scan.entries);

    let proposals = engine.propose(&scan.entries, &SilentReporter);
    assert_eq!(proposals.len(), 4);

    let pdf = proposals
        .iter()
        .find(|p| p.original_path().ends_with("untitled.pdf"))
        .unwrap();
    assert!(pdf.new_name().starts_with("Quarterly Report_"));
    assert!(pdf.new_name().ends_with(".pdf"));
    assert_eq!(pdf.confidence(), 0.85);

    let folder = proposals
        .iter()
        .find(|p| p.original_path().ends_with("New Folder"))
        .unwrap();
    assert_eq!(folder.category(), Category::Folder);
    assert!(folder.new_name().starts_with("Folder_"));

    let image = proposals
        .iter()
        .find(|p| p.original_path().ends_with("image.png"))
        .unwrap();
    assert!(image.new_name().starts_with("Image_"));
    assert_eq!(image.confidence(), 0.7);

    // The image is renamed before the folder that holds it.
    let position = |name: &str| {
        proposals
            .iter()
            .position(|p| p.original_path().ends_with(name))
            .unwrap()
    };
    assert!(position("image.png") < position("New Folder"));

    let simulated = engine.dry_run(&proposals);
    assert!(simulated.iter().all(|s| s.verdict == Verdict::Ok), "{:?}", simulated);
    assert_eq!(file_count(&root), files_before);
    assert!(root.join("Untitled.txt").exists());

    let results = engine.apply(&proposals, &SilentReporter).unwrap();
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.succeeded()));
    for result in &results {
        assert!(!result.original_path.exists());
    }

    let renamed_folder = folder.target_path();
    assert!(renamed_folder.is_dir());
    assert!(renamed_folder.join(image.new_name()).is_file());
    assert!(root.join(pdf.new_name()).is_file());
    assert!(root.join("notes.txt").exists());
    assert!(root.join(".hidden").join("Untitled.txt").exists());
    assert_eq!(file_count(&root), files_before);

    // The new names still contain placeholder words, but re-proposing them
    // yields the same names, so there is nothing left to do.
    let rescan = engine.scan(&SilentReporter).unwrap();
    assert_eq!(rescan.entries.len(), 2, "entries: {:?}", rescan.entries);
    assert!(engine.propose(&rescan.entries, &SilentReporter).is_empty());
}

#[test]
fn test_nested_placeholders_apply_as_one_batch() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("inbox");
    let inner = root.join("New Folder").join("New Folder");
    fs::create_dir_all(&inner).unwrap();
    fs::write(inner.join("Untitled.txt"), "draft").unwrap();

    let engine = RenameEngine::new(config_for(&root)).with_hint_provider(NoHints);
    let scan = engine.scan(&SilentReporter).unwrap();
    let proposals = engine.propose(&scan.entries, &SilentReporter);
    assert_eq!(proposals.len(), 3);

    let simulated = engine.dry_run(&proposals);
    assert!(simulated.iter().all(|s| s.would_succeed()), "{:?}", simulated);

    let results = engine.apply(&proposals, &SilentReporter).unwrap();
    assert!(results.iter().all(|r| r.succeeded()));
    assert_eq!(file_count(&root), 1);
    assert!(!root.join("New Folder").exists());
}

#[test]
fn test_second_apply_only_renames_new_entries() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("inbox");
    fs::create_dir_all(&root).unwrap();
    let first = root.join("Untitled.txt");
    fs::write(&first, "first").unwrap();
    set_modified(&first, Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap());

    let engine = RenameEngine::new(config_for(&root)).with_hint_provider(NoHints);
    let scan = engine.scan(&SilentReporter).unwrap();
    let proposals = engine.propose(&scan.entries, &SilentReporter);
    engine.apply(&proposals, &SilentReporter).unwrap();
    assert!(root.join("Document_2024-03-15_14-30.txt").is_file());

    let second = root.join("Untitled 2.txt");
    fs::write(&second, "second").unwrap();
    set_modified(&second, Utc.with_ymd_and_hms(2024, 3, 16, 9, 0, 0).unwrap());

    let scan = engine.scan(&SilentReporter).unwrap();
    assert_eq!(scan.entries.len(), 2);
    let proposals = engine.propose(&scan.entries, &SilentReporter);
    assert_eq!(proposals.len(), 1);
    assert!(proposals[0].original_path().ends_with("Untitled 2.txt"));

    assert!(engine.dry_run(&proposals)[0].would_succeed());
    engine.apply(&proposals, &SilentReporter).unwrap();
    assert_eq!(
        fs::read_to_string(root.join("Document_2024-03-16_09-00.txt")).unwrap(),
        "second"
    );
    assert_eq!(
        fs::read_to_string(root.join("Document_2024-03-15_14-30.txt")).unwrap(),
        "first"
    );
}

#[test]
fn test_nested_roots_are_scanned_once() {
    let tmp = tempdir().unwrap();
    let inner = tmp.path().join("inner");
    fs::create_dir(&inner).unwrap();
    fs::write(inner.join("Untitled.txt"), "").unwrap();

    let engine = RenameEngine::new(config_for(tmp.path()))
        .with_roots(vec![
            tmp.path().to_string_lossy().into_owned(),
            inner.to_string_lossy().into_owned(),
        ]);
    let scan = engine.scan(&SilentReporter).unwrap();

    assert_eq!(scan.roots, vec![tmp.path().to_path_buf()]);
    assert_eq!(scan.entries.len(), 1);
}

#[test]
fn test_min_confidence_filters_proposals() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("inbox");
    create_test_tree(&root);

    let config = AppConfig {
        min_confidence: 0.8,
        ..config_for(&root)
    };
    let engine = RenameEngine::new(config).with_hint_provider(NoHints);

    let scan = engine.scan(&SilentReporter).unwrap();
    let proposals = engine.propose(&scan.entries, &SilentReporter);

    // Only the folder reaches 0.8 without content hints.
    assert_eq!(proposals.len(), 1);
    assert!(proposals[0].original_path().ends_with("New Folder"));
}

#[test]
fn test_command_line_roots_override_config() {
    let tmp = tempdir().unwrap();
    let configured = tmp.path().join("configured");
    let given = tmp.path().join("given");
    fs::create_dir_all(&configured).unwrap();
    fs::create_dir_all(&given).unwrap();
    fs::write(configured.join("Untitled.txt"), "").unwrap();
    fs::write(given.join("Untitled 2.txt"), "").unwrap();

    let engine = RenameEngine::new(config_for(&configured))
        .with_roots(vec![given.to_string_lossy().into_owned()]);
    let scan = engine.scan(&SilentReporter).unwrap();

    assert_eq!(scan.entries.len(), 1);
    assert!(scan.entries[0].path.starts_with(&given));
}

#[test]
fn test_scan_of_missing_root_fails() {
    let tmp = tempdir().unwrap();
    let engine = RenameEngine::new(config_for(&tmp.path().join("missing")));
    assert!(engine.scan(&SilentReporter).is_err());
}
