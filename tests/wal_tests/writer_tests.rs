//! Tests for the WAL writer
//!
//! These tests verify:
//! - Append positions and value ranges
//! - Reopening resumes at the end of the file
//! - Sync strategies
//! - Timestamps never go backwards
//! - Positional reads of value ranges

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use vaultkv::config::WalSyncStrategy;
use vaultkv::wal::{read_range, WalReader, WalRecord, WalWriter, HEADER_SIZE};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.log");
    (temp_dir, wal_path)
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    assert!(wal_path.exists());
    assert_eq!(writer.position(), 0);
}

#[test]
fn test_append_returns_record_range() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    let first = WalRecord::put("a", "b", 1);
    let second = WalRecord::put("key", "value", 2);

    let r1 = writer.append(&first).unwrap();
    let r2 = writer.append(&second).unwrap();

    assert_eq!(r1.start, 0);
    assert_eq!(r1.end, first.total_len());
    assert_eq!(r2.start, r1.end);
    assert_eq!(r2.end, r1.end + second.total_len());
    assert_eq!(writer.position(), r2.end);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), r2.end);
}

#[test]
fn test_value_range_points_at_value_bytes() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    writer.append(&WalRecord::put("first", "one", 1)).unwrap();
    let record = WalRecord::put("second", "two-two", 1);
    let appended = writer.append(&record).unwrap();
    let (start, end) = appended.value_range(record.value_len());

    assert_eq!(start, appended.start + (HEADER_SIZE + "second".len()) as u64);
    assert_eq!(read_range(&wal_path, start, end).unwrap(), b"two-two");
}

#[test]
fn test_reopen_appends_at_end() {
    let (_temp, wal_path) = setup_temp_wal();
    let first_end = {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(&WalRecord::put("a", "1", 1)).unwrap().end
    };

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    assert_eq!(writer.position(), first_end);

    let appended = writer.append(&WalRecord::put("b", "2", 2)).unwrap();
    assert_eq!(appended.start, first_end);

    let bytes = fs::read(&wal_path).unwrap();
    let keys: Vec<Vec<u8>> = WalReader::new(&bytes)
        .filter_map(|step| match step {
            vaultkv::wal::ScanStep::Record { record, .. } => Some(record.key),
            _ => None,
        })
        .collect();
    assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
}

#[test]
fn test_truncate_to() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    let first = writer.append(&WalRecord::put("a", "1", 1)).unwrap();
    writer.append(&WalRecord::put("b", "2", 1)).unwrap();
    writer.truncate_to(first.end).unwrap();

    assert_eq!(writer.position(), first.end);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), first.end);
}

// =============================================================================
// Sync Strategy Tests
// =============================================================================

#[test]
fn test_every_write_leaves_nothing_unsynced() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    writer.append(&WalRecord::put("a", "1", 1)).unwrap();
    assert_eq!(writer.unsynced(), 0);
}

#[test]
fn test_every_n_entries_syncs_on_threshold() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer =
        WalWriter::open(&wal_path, WalSyncStrategy::EveryNEntries { count: 3 }).unwrap();

    writer.append(&WalRecord::put("a", "1", 1)).unwrap();
    writer.append(&WalRecord::put("b", "2", 1)).unwrap();
    assert_eq!(writer.unsynced(), 2);

    writer.append(&WalRecord::put("c", "3", 1)).unwrap();
    assert_eq!(writer.unsynced(), 0);
}

#[test]
fn test_os_buffered_is_still_readable() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::OsBuffered).unwrap();

    let record = WalRecord::put("k", "visible", 1);
    let appended = writer.append(&record).unwrap();
    let (start, end) = appended.value_range(record.value_len());

    assert_eq!(read_range(&wal_path, start, end).unwrap(), b"visible");

    writer.sync().unwrap();
    assert_eq!(writer.unsynced(), 0);
}

// =============================================================================
// Timestamp Tests
// =============================================================================

#[test]
fn test_timestamps_are_non_decreasing() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    let mut last = 0;
    for _ in 0..100 {
        let ts = writer.next_timestamp();
        assert!(ts >= last);
        last = ts;
    }
    assert!(last > 1_600_000_000, "timestamp should be seconds since epoch");
}

#[test]
fn test_seeded_timestamp_is_a_floor() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    let ahead = 4_000_000_000u64;

    writer.seed_timestamp(ahead);
    assert_eq!(writer.next_timestamp(), ahead);

    // A lower seed never pulls the clock back
    writer.seed_timestamp(5);
    assert_eq!(writer.next_timestamp(), ahead);
}

// =============================================================================
// Positional Read Tests
// =============================================================================

#[test]
fn test_read_range_past_end_fails() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    let end = writer.append(&WalRecord::put("a", "b", 1)).unwrap().end;

    assert!(read_range(&wal_path, end - 1, end + 10).is_err());
}

#[test]
fn test_read_range_missing_file_fails() {
    let (_temp, wal_path) = setup_temp_wal();
    assert!(read_range(&wal_path, 0, 1).is_err());
}

#[test]
fn test_read_empty_range() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    let end = writer.append(&WalRecord::put("empty", "", 1)).unwrap().end;

    assert_eq!(read_range(&wal_path, end, end).unwrap(), Vec::<u8>::new());
}
