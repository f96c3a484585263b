//! Memory mapping primitives
//!
//! This module holds the pieces shared by every platform backend: the
//! protection flags, the access modes a mapping can be opened with, the
//! policy that turns a requested [`MapSize`] into a mapped extent, and the
//! [`Mmap`] trait each backend implements.
//!
//! Key concepts:
//! - **Access mode**: chosen at the type level with [`ReadOnly`] or
//!   [`ReadWrite`]; decides open flags, page protection and whether teardown
//!   flushes dirty pages.
//! - **Native handle**: the backend's bundle of OS resources, each field an
//!   `Option` so "is this resource live" never depends on sentinel values.
//!
//! # Safety
//! A mapping hands out raw access to process memory. The backend trait only
//! releases resources through `unsafe` functions whose callers promise that no
//! borrow of the mapped bytes outlives the call.

pub use crate::os::{DefaultMmap, NativeHandle};

use crate::{ErrorKind, Result, error::mmio_error};
use bitflags::bitflags;
use core::{ffi::c_int, fmt::Debug, ptr::NonNull};
use std::path::Path;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    /// Memory protection flags for a mapped region.
    ///
    /// The values match the POSIX `PROT_*` constants; the Windows backend
    /// translates them to `PAGE_*` and `FILE_MAP_*` values.
    pub struct ProtFlags: c_int {
        /// No access allowed.
        const PROT_NONE = 0;

        /// Allow reading from the memory region.
        const PROT_READ = 1;

        /// Allow writing to the memory region.
        const PROT_WRITE = 2;
    }
}

/// The runtime mirror of a [`MapMode`], handed to backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

impl Access {
    #[inline]
    pub const fn is_writable(self) -> bool {
        matches!(self, Access::ReadWrite)
    }

    /// Page protection a mapping opened with this access receives.
    #[inline]
    pub fn prot(self) -> ProtFlags {
        match self {
            Access::ReadOnly => ProtFlags::PROT_READ,
            Access::ReadWrite => ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::ReadOnly {}
    impl Sealed for super::ReadWrite {}
}

/// Type-level access mode of a [`MappedFile`](crate::MappedFile).
///
/// Sealed: the only modes are [`ReadOnly`] and [`ReadWrite`].
pub trait MapMode: sealed::Sealed + Debug {
    const ACCESS: Access;
}

/// Shared read access. The file must exist.
#[derive(Debug)]
pub enum ReadOnly {}

/// Shared read and write access. The file is created if absent, and dirty
/// pages are written back before the mapping is released.
#[derive(Debug)]
pub enum ReadWrite {}

impl MapMode for ReadOnly {
    const ACCESS: Access = Access::ReadOnly;
}

impl MapMode for ReadWrite {
    const ACCESS: Access = Access::ReadWrite;
}

/// How many bytes of a file to map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MapSize {
    /// Use the file's current on-disk size.
    #[default]
    Dynamic,
    /// Map exactly this many bytes.
    ///
    /// A read-write mapping grows the file when it is shorter. A read-only
    /// mapping fails instead. A longer file is never truncated: only the
    /// first `n` bytes are mapped.
    Exact(usize),
}

impl From<usize> for MapSize {
    #[inline]
    fn from(len: usize) -> Self {
        MapSize::Exact(len)
    }
}

/// The extent a backend should map, resolved from a [`MapSize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    /// Number of bytes to map.
    pub len: usize,
    /// The file must be extended to `len` before it is mapped.
    pub grow: bool,
}

impl MapSize {
    /// Applies the size policy to a file that is currently `file_len` bytes long.
    pub fn resolve(self, file_len: u64, access: Access) -> Result<Extent> {
        let extent = match self {
            MapSize::Dynamic => {
                let len = usize::try_from(file_len)
                    .ok()
                    .filter(|&len| len <= isize::MAX as usize)
                    .ok_or_else(|| {
                        mmio_error(
                            "mmap",
                            ErrorKind::FileTooLarge,
                            "file does not fit in the address space",
                        )
                    })?;
                Extent { len, grow: false }
            }
            MapSize::Exact(len) => {
                if len > isize::MAX as usize {
                    return Err(mmio_error(
                        "mmap",
                        ErrorKind::FileTooLarge,
                        "requested size does not fit in the address space",
                    ));
                }
                let grow = len as u64 > file_len;
                if grow && !access.is_writable() {
                    return Err(mmio_error(
                        "mmap",
                        ErrorKind::InvalidInput,
                        "requested size exceeds a file opened read-only",
                    ));
                }
                Extent { len, grow }
            }
        };
        if extent.len == 0 {
            return Err(mmio_error(
                "mmap",
                ErrorKind::InvalidInput,
                "cannot map an empty range",
            ));
        }
        Ok(extent)
    }
}

/// A platform backend for file mappings.
///
/// A backend acquires OS resources into its [`Mmap::Handle`] one at a time,
/// recording each as soon as it is live. If any step fails it returns early
/// and leaves the partially filled handle behind; the caller then runs
/// [`Mmap::unmap`], which releases whatever is live in reverse acquisition
/// order. This keeps rollback and normal teardown on a single path.
///
/// Backends are chosen at compile time; see [`DefaultMmap`].
pub trait Mmap {
    /// The native resources of one mapping. `Default` is the closed state.
    type Handle: Default + Debug;

    /// Opens `path` and maps it according to `access` and `size`.
    ///
    /// Returns the number of bytes mapped. On failure, `handle` may hold
    /// live resources that the caller must release with [`Mmap::unmap`].
    ///
    /// `handle` must be in its closed state.
    fn map(
        handle: &mut Self::Handle,
        path: &Path,
        access: Access,
        size: MapSize,
    ) -> Result<usize>;

    /// Releases every live resource in `handle`, newest first, and leaves it
    /// closed. Read-write mappings are flushed before they are unmapped.
    ///
    /// Failures here mean the OS state is already corrupt; they trip a debug
    /// assertion and are otherwise only logged.
    ///
    /// # Safety
    /// `len` and `access` must be the values the mapping was established
    /// with, and no reference into the mapped bytes may outlive this call.
    unsafe fn unmap(handle: &mut Self::Handle, len: usize, access: Access);

    /// Synchronously writes dirty pages of a read-write mapping back to the file.
    ///
    /// # Safety
    /// `len` must be the length the live mapping in `handle` was established with.
    unsafe fn flush(handle: &Self::Handle, len: usize) -> Result<()>;

    /// First mapped byte, or `None` when no mapping is live.
    fn base(handle: &Self::Handle) -> Option<NonNull<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_uses_file_length() {
        let extent = MapSize::Dynamic.resolve(44, Access::ReadOnly).unwrap();
        assert_eq!(extent, Extent { len: 44, grow: false });
    }

    #[test]
    fn exact_prefix_never_grows() {
        for access in [Access::ReadOnly, Access::ReadWrite] {
            let extent = MapSize::Exact(19).resolve(44, access).unwrap();
            assert_eq!(extent, Extent { len: 19, grow: false });
        }
    }

    #[test]
    fn exact_past_end_grows_only_when_writable() {
        let extent = MapSize::Exact(100).resolve(0, Access::ReadWrite).unwrap();
        assert_eq!(extent, Extent { len: 100, grow: true });

        let err = MapSize::Exact(100).resolve(44, Access::ReadOnly).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn empty_extent_is_rejected() {
        let err = MapSize::Dynamic.resolve(0, Access::ReadOnly).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = MapSize::Exact(0).resolve(10, Access::ReadWrite).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn oversized_request_is_too_large() {
        let err = MapSize::Exact(usize::MAX).resolve(0, Access::ReadWrite).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileTooLarge);
    }

    #[test]
    fn access_protection() {
        assert_eq!(Access::ReadOnly.prot(), ProtFlags::PROT_READ);
        assert!(Access::ReadWrite.prot().contains(ProtFlags::PROT_WRITE));
        assert_eq!(ReadWrite::ACCESS, Access::ReadWrite);
    }

    #[test]
    fn size_from_usize_is_exact() {
        assert_eq!(MapSize::from(42), MapSize::Exact(42));
        assert_eq!(MapSize::default(), MapSize::Dynamic);
    }
}
