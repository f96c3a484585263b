use super::{c_path, mapped_base, teardown_failed};
use crate::{
    Error, Result,
    error::os_error,
    mmap::{Access, MapSize, Mmap},
};
use core::{
    ffi::c_void,
    mem::MaybeUninit,
    ptr::{NonNull, null_mut},
};
use libc::{O_CLOEXEC, O_CREAT, O_RDONLY, O_RDWR};
use std::{io, os::fd::RawFd, path::Path};

/// -rw-r--r--
const CREATE_MODE: libc::mode_t = 0o644;

/// An implementation of Mmap trait
pub struct DefaultMmap;

/// The raw resources behind a mapping on unix.
///
/// Callers must not close the descriptor or unmap the address; the owning
/// [`MappedFile`](crate::MappedFile) does that.
#[derive(Debug, Default)]
pub struct NativeHandle {
    fd: Option<RawFd>,
    addr: Option<NonNull<c_void>>,
}

// SAFETY: the handle only names OS resources; access to the mapped bytes is
// governed by the borrows `MappedFile` hands out.
unsafe impl Send for NativeHandle {}
unsafe impl Sync for NativeHandle {}

impl NativeHandle {
    /// The open file descriptor, if any.
    #[inline]
    pub fn fd(&self) -> Option<RawFd> {
        self.fd
    }

    /// Start of the mapping, if any.
    #[inline]
    pub fn addr(&self) -> Option<NonNull<c_void>> {
        self.addr
    }
}

#[inline]
fn last_os_error(op: &'static str) -> Error {
    os_error(op, errno())
}

#[inline]
fn errno() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

impl Mmap for DefaultMmap {
    type Handle = NativeHandle;

    fn map(
        handle: &mut NativeHandle,
        path: &Path,
        access: Access,
        size: MapSize,
    ) -> Result<usize> {
        debug_assert!(handle.fd.is_none() && handle.addr.is_none());
        let name = c_path(path)?;
        let flags = match access {
            Access::ReadOnly => O_RDONLY,
            Access::ReadWrite => O_RDWR | O_CREAT,
        } | O_CLOEXEC;
        let fd = unsafe { libc::open(name.as_ptr(), flags, CREATE_MODE as libc::c_uint) };
        if fd == -1 {
            return Err(last_os_error("open"));
        }
        handle.fd = Some(fd);

        let mut stat = MaybeUninit::<libc::stat>::uninit();
        if unsafe { libc::fstat(fd, stat.as_mut_ptr()) } == -1 {
            return Err(last_os_error("fstat"));
        }
        let stat = unsafe { stat.assume_init() };
        // a read-only open succeeds on a directory; refuse it here
        if stat.st_mode & libc::S_IFMT == libc::S_IFDIR {
            return Err(os_error("open", libc::EISDIR));
        }

        let extent = size.resolve(stat.st_size as u64, access)?;
        if extent.grow {
            if unsafe { libc::ftruncate(fd, extent.len as libc::off_t) } == -1 {
                return Err(last_os_error("ftruncate"));
            }
            #[cfg(feature = "log")]
            log::trace!(
                "[Grow] fd: {}, from: {}, to: {}",
                fd,
                stat.st_size,
                extent.len
            );
        }

        let ptr = unsafe {
            libc::mmap(
                null_mut(),
                extent.len,
                access.prot().bits(),
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if core::ptr::eq(ptr, libc::MAP_FAILED) {
            return Err(last_os_error("mmap"));
        }
        handle.addr = Some(mapped_base(ptr, extent.len, |ptr, len| unsafe {
            let _ = libc::munmap(ptr, len);
        })?);

        #[cfg(feature = "log")]
        log::trace!(
            "[Mmap] address: {:p}, length: {}, fd: {}, prot: {:?}",
            ptr,
            extent.len,
            fd,
            access.prot()
        );
        Ok(extent.len)
    }

    unsafe fn unmap(handle: &mut NativeHandle, len: usize, access: Access) {
        if let Some(addr) = handle.addr.take() {
            if access.is_writable() {
                if unsafe { libc::msync(addr.as_ptr(), len, libc::MS_SYNC) } != 0 {
                    teardown_failed("msync", errno());
                }
            }
            if unsafe { libc::munmap(addr.as_ptr(), len) } != 0 {
                teardown_failed("munmap", errno());
            }
            #[cfg(feature = "log")]
            log::trace!("[Munmap] address: {:p}, length: {}", addr, len);
        }

        if let Some(fd) = handle.fd.take() {
            if unsafe { libc::close(fd) } != 0 {
                teardown_failed("close", errno());
            }
        }
    }

    unsafe fn flush(handle: &NativeHandle, len: usize) -> Result<()> {
        if let Some(addr) = handle.addr {
            if unsafe { libc::msync(addr.as_ptr(), len, libc::MS_SYNC) } != 0 {
                return Err(last_os_error("msync"));
            }
        }
        Ok(())
    }

    #[inline]
    fn base(handle: &NativeHandle) -> Option<NonNull<u8>> {
        handle.addr.map(NonNull::cast)
    }
}
