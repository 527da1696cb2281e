//! Rotation behavior of the file sink on a real filesystem

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, Local, TimeZone, Utc};
use fanlog_logger::{FanoutWriter, Logger, Sink};
use fanlog_logger_file::segment::backup_path;
use fanlog_logger_file::{
    Clock, FileLogFormat, FileSinkConfigBuilder, ManualClock, RotatingFileSink, RotationPolicy,
    pattern,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// A newline-free record that occupies exactly `len` bytes on disk
fn record(tag: usize, len: usize) -> Vec<u8> {
    let head = format!(r#"{{"n":{tag},"pad":""#);
    let tail = r#""}"#;
    let pad = len - 1 - head.len() - tail.len();
    format!("{head}{}{tail}", "x".repeat(pad)).into_bytes()
}

fn backups(dir: &Path, name: &str) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&format!("{name}.")))
        })
        .collect();
    found.sort();
    found
}

fn size_sink(dir: &TempDir, max_bytes: u64, max_segments: usize) -> RotatingFileSink {
    RotatingFileSink::new(
        FileSinkConfigBuilder::new()
            .base_path(dir.path())
            .file_name("app.log")
            .policy(RotationPolicy::by_size(max_bytes, max_segments))
            .build(),
    )
    .unwrap()
}

#[test]
fn test_single_rotation_at_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let sink = size_sink(&dir, 1024, 3);
    let active = dir.path().join("app.log");

    for i in 0..20 {
        let rec = record(i, 100);
        assert_eq!(sink.write(&rec).unwrap(), rec.len());
    }
    sink.wait_for_renumbering();

    let mut before = Vec::new();
    for i in 0..10 {
        before.extend_from_slice(&record(i, 100));
        before.push(b'\n');
    }
    assert_eq!(backups(dir.path(), "app.log"), vec![backup_path(&active, 1)]);
    assert_eq!(fs::read(backup_path(&active, 1)).unwrap(), before);
    assert_eq!(fs::metadata(&active).unwrap().len(), 1000);
}

#[test]
fn test_active_size_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let sink = size_sink(&dir, 300, 0);
    let active = dir.path().join("app.log");

    for i in 0..50 {
        sink.write(&record(i, 70)).unwrap();
        assert!(fs::metadata(&active).unwrap().len() <= 300 + 70);
    }
    sink.wait_for_renumbering();
}

#[test]
fn test_retention_keeps_exactly_k_backups() {
    let dir = tempfile::tempdir().unwrap();
    let sink = size_sink(&dir, 100, 2);
    let active = dir.path().join("app.log");

    // Every record overflows the previous one, so each write after the first rotates
    for i in 0..6 {
        sink.write(&record(i, 100)).unwrap();
    }
    sink.wait_for_renumbering();

    assert_eq!(
        backups(dir.path(), "app.log"),
        vec![backup_path(&active, 1), backup_path(&active, 2)]
    );

    // Newest backup is the record before the active one
    let newest = fs::read(backup_path(&active, 1)).unwrap();
    let oldest = fs::read(backup_path(&active, 2)).unwrap();
    assert_eq!(&newest[..newest.len() - 1], record(4, 100).as_slice());
    assert_eq!(&oldest[..oldest.len() - 1], record(3, 100).as_slice());
}

#[test]
fn test_zero_retention_keeps_everything() {
    let dir = tempfile::tempdir().unwrap();
    let sink = size_sink(&dir, 100, 0);
    let active = dir.path().join("app.log");

    for i in 0..5 {
        sink.write(&record(i, 100)).unwrap();
    }
    sink.wait_for_renumbering();

    let found = backups(dir.path(), "app.log");
    assert_eq!(found.len(), 4);
    let oldest = fs::read(backup_path(&active, 4)).unwrap();
    assert_eq!(&oldest[..oldest.len() - 1], record(0, 100).as_slice());
}

#[test]
fn test_oversized_record_does_not_rotate_empty_segment() {
    let dir = tempfile::tempdir().unwrap();
    let sink = size_sink(&dir, 50, 3);

    sink.write(&record(0, 200)).unwrap();
    sink.wait_for_renumbering();

    assert!(backups(dir.path(), "app.log").is_empty());
    assert_eq!(fs::metadata(dir.path().join("app.log")).unwrap().len(), 200);
}

#[test]
fn test_time_rotation_with_manual_clock() {
    let dir = tempfile::tempdir().unwrap();
    let start = Utc
        .with_ymd_and_hms(2024, 2, 11, 16, 5, 0)
        .unwrap()
        .with_timezone(&Local);
    let clock = Arc::new(ManualClock::new(start));
    let sink = RotatingFileSink::new(
        FileSinkConfigBuilder::new()
            .base_path(dir.path())
            .file_name("app-yyyyMMdd-HHmm.log")
            .policy(RotationPolicy::by_time())
            .clock(clock.clone())
            .build(),
    )
    .unwrap();

    let first = dir.path().join(pattern::resolve("app-yyyyMMdd-HHmm.log", &start));
    assert_eq!(sink.active_path(), Some(first.clone()));

    for i in 0..3 {
        sink.write(&record(i, 40)).unwrap();
    }
    clock.advance(Duration::seconds(30));
    sink.write(&record(3, 40)).unwrap();

    clock.advance(Duration::seconds(30));
    let later = clock.now();
    let second = dir.path().join(pattern::resolve("app-yyyyMMdd-HHmm.log", &later));
    for i in 4..6 {
        sink.write(&record(i, 40)).unwrap();
    }

    assert_ne!(first, second);
    assert_eq!(sink.active_path(), Some(second.clone()));
    assert_eq!(fs::read_to_string(&first).unwrap().lines().count(), 4);
    assert_eq!(fs::read_to_string(&second).unwrap().lines().count(), 2);
}

#[test]
fn test_time_and_size_rotation_together() {
    let dir = tempfile::tempdir().unwrap();
    let start = Utc
        .with_ymd_and_hms(2024, 2, 11, 16, 5, 0)
        .unwrap()
        .with_timezone(&Local);
    let clock = Arc::new(ManualClock::new(start));
    let sink = RotatingFileSink::new(
        FileSinkConfigBuilder::new()
            .base_path(dir.path())
            .file_name("app-HHmm.log")
            .policy(RotationPolicy::by_size(100, 2).with_time_rolling(true))
            .clock(clock.clone())
            .build(),
    )
    .unwrap();

    for i in 0..3 {
        sink.write(&record(i, 100)).unwrap();
    }
    clock.advance(Duration::minutes(1));
    for i in 3..6 {
        sink.write(&record(i, 100)).unwrap();
    }
    sink.wait_for_renumbering();

    let first_name = pattern::resolve("app-HHmm.log", &start);
    let second_name = pattern::resolve("app-HHmm.log", &clock.now());
    assert_ne!(first_name, second_name);

    for (name, tags) in [(&first_name, [2, 1, 0]), (&second_name, [5, 4, 3])] {
        let active = dir.path().join(name);
        assert_eq!(
            backups(dir.path(), name),
            vec![backup_path(&active, 1), backup_path(&active, 2)]
        );

        let files = [active.clone(), backup_path(&active, 1), backup_path(&active, 2)];
        for (path, tag) in files.iter().zip(tags) {
            let content = fs::read(path).unwrap();
            assert_eq!(&content[..content.len() - 1], record(tag, 100).as_slice());
        }
    }
}

#[test]
fn test_failed_rotation_keeps_record_out_of_old_segment() {
    let dir = tempfile::tempdir().unwrap();
    let sink = size_sink(&dir, 100, 2);
    let active = dir.path().join("app.log");

    sink.write(&record(0, 100)).unwrap();

    // A non-empty directory in the staging slot makes the rename fail
    let blocker = backup_path(&active, 0);
    fs::create_dir(&blocker).unwrap();
    fs::write(blocker.join("keep"), "").unwrap();

    let err = sink.write_record(&record(1, 100)).unwrap_err();
    assert!(matches!(err, fanlog_logger_file::Error::Rotation { .. }));
    assert!(err.to_string().contains("app.log.0"));

    let err = sink.write(&record(1, 100)).unwrap_err();
    assert!(matches!(err, fanlog_logger::Error::Sink { sink: "file", .. }));

    let content = fs::read(&active).unwrap();
    assert_eq!(&content[..content.len() - 1], record(0, 100).as_slice());

    // Once the slot is free the next write reopens the segment and rotates
    fs::remove_dir_all(&blocker).unwrap();
    sink.write(&record(2, 100)).unwrap();
    sink.wait_for_renumbering();

    let content = fs::read(&active).unwrap();
    assert_eq!(&content[..content.len() - 1], record(2, 100).as_slice());
    let newest = fs::read(backup_path(&active, 1)).unwrap();
    assert_eq!(&newest[..newest.len() - 1], record(0, 100).as_slice());
}

#[test]
fn test_failed_renumbering_does_not_fail_writes() {
    let dir = tempfile::tempdir().unwrap();
    let active = dir.path().join("app.log");

    // The oldest slot cannot be evicted or replaced
    let stuck = backup_path(&active, 2);
    fs::create_dir(&stuck).unwrap();
    fs::write(stuck.join("keep"), "").unwrap();

    let sink = size_sink(&dir, 100, 2);
    for i in 0..6 {
        let rec = record(i, 100);
        assert_eq!(sink.write(&rec).unwrap(), rec.len());
        sink.wait_for_renumbering();
    }

    assert!(stuck.is_dir());
    assert!(!backup_path(&active, 0).exists());
    let newest = fs::read(backup_path(&active, 1)).unwrap();
    assert_eq!(&newest[..newest.len() - 1], record(4, 100).as_slice());
    let content = fs::read(&active).unwrap();
    assert_eq!(&content[..content.len() - 1], record(5, 100).as_slice());
}

#[test]
fn test_waiting_alongside_rotation_keeps_backup_order() {
    const RECORDS: usize = 200;

    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(size_sink(&dir, 100, 3));
    let active = dir.path().join("app.log");
    let done = Arc::new(AtomicBool::new(false));

    let waiter = {
        let sink = sink.clone();
        let done = done.clone();
        std::thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                sink.wait_for_renumbering();
            }
        })
    };

    for i in 0..RECORDS {
        sink.write(&record(i, 100)).unwrap();
    }
    done.store(true, Ordering::Release);
    waiter.join().unwrap();
    sink.wait_for_renumbering();

    assert_eq!(
        backups(dir.path(), "app.log"),
        vec![
            backup_path(&active, 1),
            backup_path(&active, 2),
            backup_path(&active, 3)
        ]
    );
    let files = [
        active.clone(),
        backup_path(&active, 1),
        backup_path(&active, 2),
        backup_path(&active, 3),
    ];
    for (offset, path) in files.iter().enumerate() {
        let content = fs::read(path).unwrap();
        assert_eq!(
            &content[..content.len() - 1],
            record(RECORDS - 1 - offset, 100).as_slice()
        );
    }
}

#[test]
fn test_concurrent_writers_produce_intact_records() {
    const THREADS: usize = 8;
    const RECORDS: usize = 200;

    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(size_sink(&dir, 4096, 0));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let sink = sink.clone();
            std::thread::spawn(move || {
                for i in 0..RECORDS {
                    sink.write(&record(t * RECORDS + i, 64)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    sink.wait_for_renumbering();

    let mut seen = Vec::new();
    for entry in fs::read_dir(dir.path()).unwrap() {
        let content = fs::read_to_string(entry.unwrap().path()).unwrap();
        assert!(content.is_empty() || content.ends_with('\n'));
        for line in content.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            seen.push(value["n"].as_u64().unwrap());
        }
    }
    seen.sort_unstable();

    let expected: Vec<u64> = (0..(THREADS * RECORDS) as u64).collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_missing_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");

    let sink = RotatingFileSink::new(
        FileSinkConfigBuilder::new()
            .base_path(&nested)
            .file_name("app.log")
            .build(),
    )
    .unwrap();
    sink.write(br#"{"message":"hello"}"#).unwrap();

    assert_eq!(
        fs::read_to_string(nested.join("app.log")).unwrap(),
        "{\"message\":\"hello\"}\n"
    );
}

#[test]
fn test_unwritable_directory_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "").unwrap();

    let result = RotatingFileSink::new(
        FileSinkConfigBuilder::new()
            .base_path(blocker.join("logs"))
            .build(),
    );

    assert!(matches!(
        result,
        Err(fanlog_logger_file::Error::CreateDirectory { .. })
    ));
}

#[test]
fn test_text_format_renders_like_console() {
    let dir = tempfile::tempdir().unwrap();
    let sink = RotatingFileSink::new(
        FileSinkConfigBuilder::new()
            .base_path(dir.path())
            .file_name("app.txt")
            .format(FileLogFormat::Text)
            .build(),
    )
    .unwrap();

    sink.write(br#"{"level":"info","label":"svc","message":"up","port":8080}"#)
        .unwrap();
    let err = sink.write(b"not json").unwrap_err();

    assert!(err.to_string().contains("cannot decode event"));
    assert_eq!(
        fs::read_to_string(dir.path().join("app.txt")).unwrap(),
        "<nil> INF svc up port=8080\n"
    );
}

#[test]
fn test_logger_writes_through_fanout() {
    let dir = tempfile::tempdir().unwrap();
    let file = Arc::new(
        RotatingFileSink::new(
            FileSinkConfigBuilder::new()
                .base_path(dir.path())
                .file_name("app.log")
                .build(),
        )
        .unwrap(),
    );
    let logger = Logger::new(Arc::new(FanoutWriter::new().with_sink(file.clone())));

    logger.info().str("user", "ada").msg("signed in").unwrap();
    logger.flush().unwrap();

    let content = fs::read_to_string(dir.path().join("app.log")).unwrap();
    let value: serde_json::Value = serde_json::from_str(content.trim_end()).unwrap();
    assert_eq!(value["level"], "info");
    assert_eq!(value["user"], "ada");
    assert_eq!(value["message"], "signed in");
}
