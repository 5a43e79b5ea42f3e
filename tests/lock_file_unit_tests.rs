//! Unit tests for the single-instance lock file mechanism.
//!
//! These tests verify the low-level file locking behavior without running the
//! full brightr binary. The lock file prevents multiple instances from
//! fighting over the backlight; its content is the owning PID, written only
//! for diagnostics.
//!
//! The open must not truncate before the lock is acquired: a losing instance
//! that truncated on open would destroy the winner's PID record.

use fs2::FileExt;
use serial_test::serial;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use tempfile::tempdir;

/// Open a lock file the way brightr does: create if missing, never truncate.
fn open_lock(path: &std::path::Path) -> File {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .unwrap()
}

/// Write a PID into a held lock file, truncating only after the lock is held.
fn write_pid(file: &mut File, pid: u32) {
    file.set_len(0).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    writeln!(file, "{}", pid).unwrap();
    file.flush().unwrap();
}

/// Two instances contend for the lock; exactly one wins and the loser sees
/// the winner's PID intact.
#[test]
#[serial]
fn test_exactly_one_instance_acquires_lock() {
    let temp_dir = tempdir().unwrap();
    let lock_path = temp_dir.path().join("brightr.lock");

    let mut first = open_lock(&lock_path);
    first.try_lock_exclusive().expect("first instance should win");
    write_pid(&mut first, 11111);

    // Second instance: open succeeds, lock fails
    let second = open_lock(&lock_path);
    assert!(
        second.try_lock_exclusive().is_err(),
        "second instance must fail to acquire the lock"
    );

    // The loser can still read the winner's PID for its error message
    drop(second);
    let content = fs::read_to_string(&lock_path).unwrap();
    assert_eq!(content.trim(), "11111");
}

/// Opening without truncation preserves the winner's PID record, where a
/// plain `File::create` would have destroyed it.
#[test]
#[serial]
fn test_lock_file_not_truncated_before_lock() {
    let temp_dir = tempdir().unwrap();
    let lock_path = temp_dir.path().join("brightr.lock");

    let mut first = open_lock(&lock_path);
    first.try_lock_exclusive().unwrap();
    write_pid(&mut first, 12345);

    // File::create truncates immediately, even while the lock is held
    let created = File::create(&lock_path).unwrap();
    drop(created);
    let content = fs::read_to_string(&lock_path).unwrap();
    assert_eq!(content, "", "File::create truncates the file immediately");

    // Restore and verify the non-truncating open leaves content intact
    write_pid(&mut first, 12345);
    let second = open_lock(&lock_path);
    assert!(second.try_lock_exclusive().is_err());
    drop(second);
    let content = fs::read_to_string(&lock_path).unwrap();
    assert_eq!(content.trim(), "12345", "PID should be preserved");
}

/// After the holder releases, a later instance acquires the lock and replaces
/// the PID record.
#[test]
#[serial]
fn test_lock_released_on_drop() {
    let temp_dir = tempdir().unwrap();
    let lock_path = temp_dir.path().join("brightr.lock");

    let mut first = open_lock(&lock_path);
    first.try_lock_exclusive().unwrap();
    write_pid(&mut first, 11111);
    drop(first);

    let mut next = open_lock(&lock_path);
    next.try_lock_exclusive()
        .expect("lock should be free after the holder exits");
    write_pid(&mut next, 22222);

    drop(next);
    let content = fs::read_to_string(&lock_path).unwrap();
    assert_eq!(content.trim(), "22222");
}

/// A leftover lock file from a crashed process is not an obstacle: the
/// advisory lock died with the process, so the next instance simply locks
/// the existing file and overwrites the stale PID.
#[test]
#[serial]
fn test_stale_lock_file_is_reclaimed() {
    let temp_dir = tempdir().unwrap();
    let lock_path = temp_dir.path().join("brightr.lock");

    // Simulate a crash: file exists with a dead PID, no lock held
    fs::write(&lock_path, "999999\n").unwrap();

    let mut instance = open_lock(&lock_path);
    instance
        .try_lock_exclusive()
        .expect("stale file should not block a new instance");
    write_pid(&mut instance, 33333);

    drop(instance);
    let content = fs::read_to_string(&lock_path).unwrap();
    assert_eq!(content.trim(), "33333");
}
