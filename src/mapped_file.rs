use crate::{
    Error, ErrorKind, Result,
    mmap::{DefaultMmap, MapMode, MapSize, Mmap, NativeHandle, ReadOnly, ReadWrite},
};
use core::{
    fmt::{self, Debug},
    marker::PhantomData,
    ops::{Deref, DerefMut},
    ptr::{self, NonNull},
    slice,
};
use std::path::{Path, PathBuf};

/// A read-only mapping.
pub type MappedFileSource = MappedFile<ReadOnly>;
/// A read-write mapping.
pub type MappedFileSink = MappedFile<ReadWrite>;

/// The outcome of [`MappedFile::try_open`].
///
/// Only `try_open` creates these, so a successful `OpenResult` always means
/// a mapping was established.
#[must_use = "a failed open leaves the file closed"]
#[derive(Debug)]
pub struct OpenResult {
    error: Option<Error>,
}

impl OpenResult {
    #[inline]
    fn success() -> Self {
        Self { error: None }
    }

    #[inline]
    fn failure(error: Error) -> Self {
        Self { error: Some(error) }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    #[inline]
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// The error, when the open failed.
    #[inline]
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// The portable category of the failure, when the open failed.
    #[inline]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(Error::kind)
    }

    #[inline]
    pub fn into_result(self) -> Result<()> {
        match self.error {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

impl From<OpenResult> for Result<()> {
    #[inline]
    fn from(result: OpenResult) -> Self {
        result.into_result()
    }
}

impl From<OpenResult> for bool {
    #[inline]
    fn from(result: OpenResult) -> Self {
        result.is_ok()
    }
}

/// A file mapped into memory.
///
/// `M` is [`ReadOnly`] or [`ReadWrite`] and fixes at compile time whether
/// the mapped bytes can be written: only `MappedFile<ReadWrite>` hands out
/// `&mut [u8]` or `*mut u8`.
///
/// A `MappedFile` is either closed, owning nothing and reporting a length of
/// zero, or open, owning a live mapping of `len()` bytes. It is closed on
/// drop; a read-write mapping is flushed to its file first.
///
/// # Examples
/// ```no_run
/// use mmio::{MapSize, MappedFileSink, MappedFileSource};
///
/// let mut sink = MappedFileSink::open("greeting.txt", MapSize::Exact(5))?;
/// sink.copy_from_slice(b"hello");
/// sink.close();
///
/// let source = MappedFileSource::open("greeting.txt", MapSize::Dynamic)?;
/// assert_eq!(&source[..], b"hello");
/// # Ok::<(), mmio::Error>(())
/// ```
pub struct MappedFile<M: MapMode> {
    handle: NativeHandle,
    len: usize,
    path: Option<PathBuf>,
    _mode: PhantomData<M>,
}

impl<M: MapMode> MappedFile<M> {
    /// Creates a closed `MappedFile`.
    #[inline]
    pub fn new() -> Self {
        Self {
            handle: NativeHandle::default(),
            len: 0,
            path: None,
            _mode: PhantomData,
        }
    }

    /// Maps `path` and returns the open file, or the error that prevented it.
    ///
    /// This is [`try_open`](Self::try_open) on a fresh handle for callers that
    /// treat a failed mapping as fatal.
    pub fn open(path: impl AsRef<Path>, size: MapSize) -> Result<Self> {
        let mut file = Self::new();
        file.try_open(path, size).into_result()?;
        Ok(file)
    }

    /// Closes any current mapping, then maps `path`.
    ///
    /// On failure every resource acquired along the way has been released and
    /// the file is left closed.
    pub fn try_open(&mut self, path: impl AsRef<Path>, size: MapSize) -> OpenResult {
        self.close();
        let path = path.as_ref();
        match DefaultMmap::map(&mut self.handle, path, M::ACCESS, size) {
            Ok(len) => {
                self.len = len;
                self.path = Some(path.to_path_buf());
                #[cfg(feature = "log")]
                log::debug!(
                    "Opened {:?} mapping of {}: {} bytes",
                    M::ACCESS,
                    path.display(),
                    len
                );
                OpenResult::success()
            }
            Err(err) => {
                // the view is always acquired last, so only files and
                // mapping objects can be left behind
                debug_assert!(DefaultMmap::base(&self.handle).is_none());
                // SAFETY: nothing was mapped, so there are no borrows to outlive.
                unsafe { DefaultMmap::unmap(&mut self.handle, 0, M::ACCESS) };
                #[cfg(feature = "log")]
                log::debug!("Failed to map {}: {}", path.display(), err);
                OpenResult::failure(err)
            }
        }
    }

    /// Releases the mapping and the file. Does nothing when already closed.
    pub fn close(&mut self) {
        // SAFETY: `&mut self` guarantees no slice into the mapping is alive.
        unsafe { DefaultMmap::unmap(&mut self.handle, self.len, M::ACCESS) };
        #[cfg(feature = "log")]
        if let Some(path) = &self.path {
            log::debug!("Closed mapping of {}", path.display());
        }
        self.len = 0;
        self.path = None;
    }

    /// Pointer to the first mapped byte, or null when closed.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        DefaultMmap::base(&self.handle).map_or(ptr::null(), |base| base.as_ptr().cast_const())
    }

    /// The mapped bytes. Empty when closed.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match DefaultMmap::base(&self.handle) {
            // SAFETY: the mapping covers `len` bytes and lives as long as `self`.
            Some(base) => unsafe { slice::from_raw_parts(base.as_ptr(), self.len) },
            None => &[],
        }
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, u8> {
        self.as_slice().iter()
    }

    /// Number of mapped bytes; zero when closed.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        DefaultMmap::base(&self.handle).is_some()
    }

    /// Path of the currently mapped file.
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The raw OS resources behind the mapping.
    ///
    /// They stay owned by this `MappedFile`: do not close or unmap them.
    #[inline]
    pub fn native_handle(&self) -> &NativeHandle {
        &self.handle
    }
}

impl MappedFile<ReadWrite> {
    /// Mutable pointer to the first mapped byte, or null when closed.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        DefaultMmap::base(&self.handle).map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match DefaultMmap::base(&self.handle) {
            // SAFETY: as in `as_slice`, and `&mut self` makes the borrow unique.
            Some(base) => unsafe { slice::from_raw_parts_mut(base.as_ptr(), self.len) },
            None => &mut [],
        }
    }

    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, u8> {
        self.as_mut_slice().iter_mut()
    }

    /// Writes dirty pages back to the file without closing the mapping.
    pub fn flush(&self) -> Result<()> {
        // SAFETY: `len` is the length the live mapping was established with.
        unsafe { DefaultMmap::flush(&self.handle, self.len) }
    }
}

impl<M: MapMode> Default for MappedFile<M> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MapMode> Drop for MappedFile<M> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<M: MapMode> Debug for MappedFile<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedFile")
            .field("access", &M::ACCESS)
            .field("path", &self.path)
            .field("len", &self.len)
            .field("handle", &self.handle)
            .finish()
    }
}

impl<M: MapMode> Deref for MappedFile<M> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl DerefMut for MappedFile<ReadWrite> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl<M: MapMode> AsRef<[u8]> for MappedFile<M> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsMut<[u8]> for MappedFile<ReadWrite> {
    #[inline]
    fn as_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl<'a, M: MapMode> IntoIterator for &'a MappedFile<M> {
    type Item = &'a u8;
    type IntoIter = slice::Iter<'a, u8>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut MappedFile<ReadWrite> {
    type Item = &'a mut u8;
    type IntoIter = slice::IterMut<'a, u8>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn mapped_files_cross_threads() {
        assert_send_sync::<MappedFileSource>();
        assert_send_sync::<MappedFileSink>();
    }

    #[test]
    fn new_file_is_closed() {
        let mut file = MappedFileSource::new();
        assert!(file.as_ptr().is_null());
        assert!(file.is_empty());
        assert!(!file.is_open());
        assert_eq!(file.path(), None);
        assert_eq!(file.as_slice(), &[] as &[u8]);
        file.close();
        file.close();
        assert!(!file.is_open());
    }

    #[test]
    fn open_result_reports_failure() {
        let result = OpenResult::failure(crate::error::mmio_error(
            "mmap",
            ErrorKind::InvalidInput,
            "cannot map an empty range",
        ));
        assert!(result.is_err());
        assert_eq!(result.kind(), Some(ErrorKind::InvalidInput));
        assert!(!bool::from(result));
        assert!(OpenResult::success().into_result().is_ok());
    }
}
