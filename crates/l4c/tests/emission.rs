//! Integration tests for the emit path: gating, throttling, streaming and
//! concurrent writers sharing one context.

use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use l4c::{
    ContextTable, Destination, Emission, FileOptions, ManualClock, RecordStyle, Severity,
    TableConfig, TimestampFormat,
};

fn file_table() -> (tempfile::TempDir, Arc<ManualClock>, ContextTable) {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
    let table = ContextTable::with_config(TableConfig::default(), clock.clone());
    (dir, clock, table)
}

// ============================================================================
// Gate
// ============================================================================

/// Verifies re-registration replaces the severity instead of accumulating.
#[test]
fn reregistration_is_idempotent() {
    let (dir, _clock, table) = file_table();
    let handle = table.open(Destination::file(dir.path().join("a.log"))).unwrap();
    table.register_message(handle, 2, Severity::Debug, "FOO_ZXC").unwrap();
    table.register_message(handle, 2, Severity::Error, "FOO_ZXC").unwrap();

    let context = table.get(handle).unwrap();
    assert!(!context.allowed(Severity::Warning, 2));
    assert!(context.allowed(Severity::Error, 2));
    assert_eq!(context.messages().len(), 1);
}

/// Verifies prefix-matched level changes report how many messages changed.
#[test]
fn set_level_by_prefix_counts_matches() {
    let (dir, _clock, table) = file_table();
    let handle = table.open(Destination::file(dir.path().join("a.log"))).unwrap();
    for (id, name) in ["FOO_QWE", "FOO_ASD", "BAR_ZXC"].iter().enumerate() {
        table.register_message(handle, id, Severity::Error, name).unwrap();
    }

    assert_eq!(table.set_level(handle, Severity::Debug, Some("FOO")).unwrap(), 2);
    assert_eq!(table.set_level(handle, Severity::Debug, Some("QUX")).unwrap(), 0);
    let context = table.get(handle).unwrap();
    assert!(context.allowed(Severity::Debug, 0));
    assert!(!context.allowed(Severity::Debug, 2));
}

// ============================================================================
// Throttle
// ============================================================================

/// Verifies a throttled attempt is dropped and counted in the next prefix.
#[test]
fn throttle_drops_and_counts() {
    let (dir, clock, table) = file_table();
    let path = dir.path().join("t.log");
    let handle = table.open(Destination::file(&path)).unwrap();
    table.register_message(handle, 0, Severity::Info, "NET_RETRY").unwrap();
    table
        .set_throttle(handle, Some(Duration::from_secs(5)), None)
        .unwrap();

    let emit = |text: &str| {
        table
            .emit(handle, Severity::Info, 0, format_args!("{text}"))
            .unwrap()
    };
    assert!(emit("first").is_written());
    clock.advance(Duration::from_secs(2));
    assert_eq!(emit("second"), Emission::Throttled);
    clock.advance(Duration::from_secs(3));
    assert!(emit("third").is_written());

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("NET_RETRY INFO[0]: first"));
    assert!(lines[1].contains("NET_RETRY INFO[1]: third"));
}

// ============================================================================
// Formatting
// ============================================================================

/// Verifies streamed fragments form a single line.
#[test]
fn streamed_record_is_one_line() {
    let (dir, _clock, table) = file_table();
    let path = dir.path().join("s.log");
    let handle = table.open(Destination::file(&path)).unwrap();
    table.register_message(handle, 0, Severity::Debug, "DB_ROWS").unwrap();
    let context = table.get(handle).unwrap();

    let style = RecordStyle::new().context("[tx 9] ");
    let mut stream = context
        .start_with(&style, Severity::Debug, 0, format_args!("rows"))
        .unwrap();
    for row in ["a", "b", "c"] {
        stream.append(format_args!(" {row}"));
    }
    stream.finish().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("DB_ROWS DEBUG[0]: [tx 9] rows a b c\n"));
}

/// Verifies an abandoned stream leaves no partial record behind.
#[test]
fn abandoned_stream_is_discarded() {
    let (dir, _clock, table) = file_table();
    let path = dir.path().join("s.log");
    let handle = table.open(Destination::file(&path)).unwrap();
    table.register_message(handle, 0, Severity::Debug, "DB_ROWS").unwrap();
    let context = table.get(handle).unwrap();

    drop(context.start(Severity::Debug, 0, format_args!("half")));
    table.close(handle).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

/// Verifies a record larger than the buffer is discarded without touching
/// the destination.
#[test]
fn oversized_record_reports_overflow() {
    let (dir, _clock, table) = file_table();
    let path = dir.path().join("o.log");
    let handle = table.open(Destination::file(&path)).unwrap();
    table.register_message(handle, 0, Severity::Info, "BIG").unwrap();
    table.set_buffer_size(handle, 128).unwrap();

    let big = "x".repeat(512);
    assert_eq!(
        table
            .emit(handle, Severity::Info, 0, format_args!("{big}"))
            .unwrap(),
        Emission::Overflow
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

/// Verifies the local timestamp style replaces the epoch seconds.
#[test]
fn local_timestamp_style() {
    let (dir, _clock, table) = file_table();
    let path = dir.path().join("l.log");
    let handle = table.open(Destination::file(&path)).unwrap();
    table.register_message(handle, 0, Severity::Info, "CLK").unwrap();
    let context = table.get(handle).unwrap();

    let style = RecordStyle::new().timestamp(TimestampFormat::Local);
    context
        .emit_with(&style, Severity::Info, 0, format_args!("tick"))
        .unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.starts_with("1700000000."));
    assert_eq!(text.as_bytes()[4], b'-');
    assert!(text.ends_with(" CLK INFO[0]: tick\n"));
}

// ============================================================================
// Concurrency
// ============================================================================

/// Verifies records from concurrent threads never interleave within a line.
#[test]
fn concurrent_writers_produce_whole_lines() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 200;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c.log");
    let table = Arc::new(ContextTable::new());
    let handle = table
        .open(Destination::File(FileOptions::new(&path).max_size(16 * 1024)))
        .unwrap();
    table.register_message(handle, 0, Severity::Info, "WORKER").unwrap();

    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                for seq in 0..PER_THREAD {
                    table
                        .emit(
                            handle,
                            Severity::Info,
                            0,
                            format_args!("worker={worker} seq={seq} payload={}", "p".repeat(40)),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    table.close(handle).unwrap();

    let mut seen = HashSet::new();
    for entry in fs::read_dir(dir.path()).unwrap() {
        let entry = entry.unwrap();
        if entry.file_type().unwrap().is_symlink() {
            continue;
        }
        for line in fs::read_to_string(entry.path()).unwrap().lines() {
            let body = line.split_once("WORKER INFO[0]: ").unwrap().1;
            assert!(body.ends_with(&"p".repeat(40)), "torn line: {line}");
            assert!(seen.insert(body.to_owned()), "duplicate line: {line}");
        }
    }
    assert_eq!(seen.len(), THREADS * PER_THREAD);
}
