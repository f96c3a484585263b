mod common;

use common::*;
use mmio::{ErrorKind, MapSize, MappedFileSink, MappedFileSource};
use rstest::rstest;
use std::{fs, io};
use tempfile::TempDir;

#[rstest]
fn strict_constructor_fails_on_directory(scratch: TempDir) {
    assert!(MappedFileSource::open(scratch.path(), MapSize::Dynamic).is_err());
    assert!(MappedFileSink::open(scratch.path(), MapSize::Dynamic).is_err());
}

#[rstest]
fn directory_error_is_descriptive(scratch: TempDir) {
    let mut file = MappedFileSource::new();
    let result = file.try_open(scratch.path(), MapSize::Dynamic);
    assert!(result.is_err());
    assert_ne!(result.kind(), Some(ErrorKind::Uncategorized));
    #[cfg(unix)]
    assert_eq!(result.kind(), Some(ErrorKind::IsADirectory));
    #[cfg(windows)]
    assert_eq!(result.kind(), Some(ErrorKind::PermissionDenied));
    assert_closed(&file);

    let mut sink = MappedFileSink::new();
    let result = sink.try_open(scratch.path(), MapSize::Exact(16));
    assert!(result.is_err());
    assert_ne!(result.kind(), Some(ErrorKind::Uncategorized));
    assert_closed(&sink);
}

#[rstest]
fn missing_file_is_not_found(scratch: TempDir) {
    let path = scratch.path().join("missing.txt");

    let err = MappedFileSource::open(&path, MapSize::Dynamic).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.raw_os_error().is_some());
    assert!(!path.exists());

    let io_err = io::Error::from(err);
    assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
}

#[rstest]
fn missing_parent_directory_is_not_found(scratch: TempDir) {
    let path = scratch.path().join("absent").join("file.txt");
    let err = MappedFileSink::open(&path, MapSize::Exact(8)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[rstest]
fn empty_file_cannot_be_mapped(scratch: TempDir) {
    let path = scratch.path().join("empty.txt");
    fs::write(&path, b"").unwrap();

    let mut file = MappedFileSource::new();
    let result = file.try_open(&path, MapSize::Dynamic);
    assert_eq!(result.kind(), Some(ErrorKind::InvalidInput));
    assert_closed(&file);

    let mut sink = MappedFileSink::new();
    let result = sink.try_open(&path, MapSize::Dynamic);
    assert_eq!(result.kind(), Some(ErrorKind::InvalidInput));
    assert_closed(&sink);
}

#[rstest]
fn failed_open_releases_previous_mapping(scratch: TempDir) {
    let path = scratch.path().join("present.txt");
    fs::write(&path, READ_PAYLOAD).unwrap();

    let mut file = MappedFileSource::open(&path, MapSize::Dynamic).unwrap();
    assert_open(&file, READ_PAYLOAD.len());

    let result = file.try_open(scratch.path().join("gone.txt"), MapSize::Dynamic);
    assert_eq!(result.kind(), Some(ErrorKind::NotFound));
    assert_closed(&file);
}

#[rstest]
fn close_is_idempotent(scratch: TempDir) {
    let mut never_opened = MappedFileSink::new();
    never_opened.close();
    never_opened.close();
    assert_closed(&never_opened);

    let path = scratch.path().join("twice.txt");
    let mut file = MappedFileSink::open(&path, MapSize::Exact(4)).unwrap();
    file.close();
    file.close();
    assert_closed(&file);
}

#[cfg(unix)]
#[rstest]
fn interior_nul_is_invalid_filename(scratch: TempDir) {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    let path = scratch.path().join(OsStr::from_bytes(b"bad\0name"));
    let err = MappedFileSource::open(&path, MapSize::Dynamic).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFilename);
    assert_eq!(err.raw_os_error(), None);
}

#[rstest]
fn error_describes_failing_call(scratch: TempDir) {
    let err = MappedFileSource::open(scratch.path().join("nope"), MapSize::Dynamic).unwrap_err();
    let message = err.to_string();
    assert!(message.contains(err.operation()));
    assert!(message.contains(&ErrorKind::NotFound.to_string()));
}

#[cfg(unix)]
#[rstest]
#[case(errno::ENOENT, ErrorKind::NotFound)]
#[case(errno::EACCES, ErrorKind::PermissionDenied)]
#[case(errno::EISDIR, ErrorKind::IsADirectory)]
#[case(-1, ErrorKind::Uncategorized)]
fn raw_codes_are_categorized(#[case] code: i32, #[case] kind: ErrorKind) {
    assert_eq!(ErrorKind::from_raw_os_error(code), kind);
}

/// errno values shared by every unix the crate supports
#[cfg(unix)]
mod errno {
    pub const ENOENT: i32 = 2;
    pub const EACCES: i32 = 13;
    pub const EISDIR: i32 = 21;
}
