//! Интеграционные тесты для Mover.
//!
//! Без watcher'а: файл создаётся и сразу передаётся в `move_file`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use downloads_organizer::activity_log::ActivityLog;
use downloads_organizer::mover::Mover;
use downloads_organizer::{MoveOutcome, OrganizerConfig, SkipReason};

fn setup() -> (TempDir, Mover) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = OrganizerConfig::new(temp_dir.path()).expect("Failed to build config");
    let log = Arc::new(ActivityLog::open(config.log_file_path()).expect("Failed to open log"));
    let mover = Mover::new(&config, log);
    (temp_dir, mover)
}

fn read_log(root: &Path) -> Vec<String> {
    fs::read_to_string(root.join("organizer_history.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_png_creates_images_directory() {
    let (temp_dir, mover) = setup();
    let root = temp_dir.path();
    let source = root.join("shot.png");
    fs::write(&source, "png").unwrap();
    assert!(!root.join("Images").exists());

    let outcome = mover.move_file(&source);

    match outcome {
        MoveOutcome::Moved {
            category,
            final_path,
        } => {
            assert_eq!(category, "Images");
            assert_eq!(final_path, root.join("Images").join("shot.png"));
        }
        other => panic!("expected Moved, got {other:?}"),
    }
    assert!(root.join("Images").is_dir());
    assert!(root.join("Images/shot.png").exists());
    assert!(!source.exists());

    let log = read_log(root);
    assert_eq!(log.len(), 1);
    assert!(log[0].ends_with("SUCCESS: Moved 'shot.png' to Images"));
}

#[test]
fn test_unmatched_extension_is_left_in_place() {
    let (temp_dir, mover) = setup();
    let root = temp_dir.path();
    let source = root.join("archive.zip");
    fs::write(&source, "zip").unwrap();

    let outcome = mover.move_file(&source);

    assert!(matches!(
        outcome,
        MoveOutcome::Skipped(SkipReason::NoMatchingCategory)
    ));
    assert!(source.exists());
    assert!(read_log(root).is_empty());
    // никаких директорий не создано
    let entries: Vec<_> = fs::read_dir(root)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .collect();
    assert!(entries.is_empty());
}

#[test]
fn test_log_file_is_never_moved() {
    let (temp_dir, mover) = setup();
    let root = temp_dir.path();
    let log_path = root.join("organizer_history.log");
    fs::write(&log_path, "2024-01-01 00:00:00 - earlier line\n").unwrap();

    let outcome = mover.move_file(&log_path);

    assert!(matches!(outcome, MoveOutcome::Skipped(SkipReason::LogFile)));
    assert!(log_path.exists());
    assert_eq!(read_log(root), vec!["2024-01-01 00:00:00 - earlier line"]);
}

#[test]
fn test_collision_gets_timestamp_suffix() {
    let (temp_dir, mover) = setup();
    let root = temp_dir.path();
    fs::create_dir(root.join("Documents")).unwrap();
    fs::write(root.join("Documents/report.pdf"), "old").unwrap();

    let source = root.join("report.pdf");
    fs::write(&source, "new").unwrap();

    let outcome = mover.move_file(&source);

    let MoveOutcome::Moved { final_path, .. } = outcome else {
        panic!("expected Moved");
    };
    let name = final_path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("report_"), "unexpected name {name}");
    assert!(name.ends_with(".pdf"), "unexpected name {name}");
    assert_eq!(fs::read_to_string(&final_path).unwrap(), "new");
    assert_eq!(
        fs::read_to_string(root.join("Documents/report.pdf")).unwrap(),
        "old"
    );
}

#[test]
fn test_collision_storm_within_one_second() {
    let (temp_dir, mover) = setup();
    let root = temp_dir.path();

    let mut finals = Vec::new();
    for i in 0..5 {
        let source = root.join("a.txt");
        fs::write(&source, format!("copy {i}")).unwrap();
        match mover.move_file(&source) {
            MoveOutcome::Moved { final_path, .. } => finals.push(final_path),
            other => panic!("expected Moved, got {other:?}"),
        }
    }

    let mut unique = finals.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 5, "paths repeated: {finals:?}");
    for (i, path) in finals.iter().enumerate() {
        assert_eq!(fs::read_to_string(path).unwrap(), format!("copy {i}"));
    }
}

#[test]
fn test_failure_is_logged_and_does_not_stop_next_file() {
    let (temp_dir, mover) = setup();
    let root = temp_dir.path();
    // "Images" занято обычным файлом: директорию создать нельзя
    fs::write(root.join("Images"), "not a dir").unwrap();

    let blocked = root.join("photo.jpg");
    fs::write(&blocked, "jpg").unwrap();
    let outcome = mover.move_file(&blocked);
    assert!(matches!(outcome, MoveOutcome::Failed(_)));
    assert!(blocked.exists());

    let other = root.join("notes.txt");
    fs::write(&other, "txt").unwrap();
    let outcome = mover.move_file(&other);
    assert!(matches!(outcome, MoveOutcome::Moved { .. }));
    assert!(root.join("Documents/notes.txt").exists());

    let log = read_log(root);
    let errors: Vec<_> = log.iter().filter(|l| l.contains(" - ERROR moving ")).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("ERROR moving photo.jpg: "));
    assert!(log.iter().any(|l| l.ends_with("SUCCESS: Moved 'notes.txt' to Documents")));
}

#[test]
fn test_vanished_source_is_a_failure() {
    let (temp_dir, mover) = setup();
    let root = temp_dir.path();

    let outcome = mover.move_file(&root.join("gone.mp3"));

    assert!(matches!(outcome, MoveOutcome::Failed(_)));
    let log = read_log(root);
    assert_eq!(log.len(), 1);
    assert!(log[0].contains("ERROR moving gone.mp3: "));
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_name_is_moved_with_its_bytes() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let (temp_dir, mover) = setup();
    let root = temp_dir.path();
    let name = OsStr::from_bytes(b"caf\xe9.png");
    let source = root.join(name);
    fs::write(&source, "png").unwrap();

    match mover.move_file(&source) {
        MoveOutcome::Moved { final_path, .. } => {
            assert_eq!(final_path, root.join("Images").join(name));
        }
        other => panic!("expected Moved, got {other:?}"),
    }
    assert!(root.join("Images").join(name).exists());
    assert!(!source.exists());

    let log = read_log(root);
    assert_eq!(log.len(), 1);
    assert!(log[0].contains("SUCCESS: Moved 'caf"), "unexpected line {}", log[0]);
}
