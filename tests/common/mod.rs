#![allow(dead_code)]

use mmio::{MapMode, MappedFile};
use rstest::fixture;
use std::mem;
use tempfile::TempDir;

pub const READ_PAYLOAD: &[u8] = b"the quick brown fox jumps over the lazy dog\n";
pub const WRITE_PAYLOAD: &[u8] = b"she sells seashells by the seashore\n";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[fixture]
pub fn scratch() -> TempDir {
    init_logger();
    tempfile::tempdir().unwrap()
}

pub fn assert_closed<M: MapMode>(file: &MappedFile<M>) {
    assert!(file.as_ptr().is_null());
    assert!(file.is_empty());
    assert!(!file.is_open());
    assert_eq!(file.len(), 0);
    assert!(file.path().is_none());

    let native = file.native_handle();
    #[cfg(unix)]
    {
        assert!(native.fd().is_none());
        assert!(native.addr().is_none());
    }
    #[cfg(windows)]
    {
        assert!(native.file().is_none());
        assert!(native.file_mapping_object().is_none());
        assert!(native.base_address().is_none());
    }
}

pub fn assert_open<M: MapMode>(file: &MappedFile<M>, len: usize) {
    assert!(!file.as_ptr().is_null());
    assert!(!file.is_empty());
    assert!(file.is_open());
    assert_eq!(file.len(), len);
    assert_eq!(file.as_slice().len(), len);
}

/// Moves the mapping out and back, checking both ends each time.
pub fn assert_movable<M: MapMode>(original: &mut MappedFile<M>, len: usize) {
    let base = original.as_ptr();
    let mut moved = mem::take(original);
    assert_closed(original);
    assert_open(&moved, len);
    assert_eq!(moved.as_ptr(), base);

    *original = mem::take(&mut moved);
    assert_open(original, len);
    assert_closed(&moved);
    assert_eq!(original.as_ptr(), base);
}
