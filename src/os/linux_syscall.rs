use super::{c_path, mapped_base, teardown_failed};
use crate::{
    Result,
    error::os_error,
    mmap::{Access, MapSize, Mmap},
};
use core::{
    ffi::{c_int, c_void},
    mem::MaybeUninit,
    ptr::{NonNull, null_mut},
};
use std::{os::fd::RawFd, path::Path};
use syscalls::Sysno;

/// -rw-r--r--
const CREATE_MODE: u32 = 0o644;

/// An implementation of Mmap trait that talks to the kernel directly.
pub struct DefaultMmap;

/// The raw resources behind a mapping on Linux.
///
/// Callers must not close the descriptor or unmap the address; the owning
/// [`MappedFile`](crate::MappedFile) does that.
#[derive(Debug, Default)]
pub struct NativeHandle {
    fd: Option<RawFd>,
    addr: Option<NonNull<c_void>>,
}

// SAFETY: see the libc backend; the handle only names OS resources.
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

/// Converts a raw syscall return value to a result.
#[inline(always)]
fn from_ret(value: usize, op: &'static str) -> Result<usize> {
    if value > -4096isize as usize {
        // Truncation of the error value is guaranteed to never occur due to
        // the above check. This is the same check that musl uses:
        // https://git.musl-libc.org/cgit/musl/tree/src/internal/syscall_ret.c?h=v1.1.15
        return Err(os_error(op, -(value as isize) as i32));
    }
    Ok(value)
}

/// Errno of a raw syscall return value, if it failed.
#[inline(always)]
fn ret_errno(value: usize) -> Option<i32> {
    (value > -4096isize as usize).then(|| -(value as isize) as i32)
}

#[inline]
fn mmap(len: usize, prot: c_int, fd: RawFd) -> Result<*mut c_void> {
    let ptr = unsafe {
        from_ret(
            syscalls::raw_syscall!(
                Sysno::mmap,
                null_mut::<c_void>(),
                len,
                prot,
                libc::MAP_SHARED,
                fd,
                0
            ),
            "mmap",
        )?
    };
    Ok(ptr as *mut c_void)
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
            Access::ReadOnly => libc::O_RDONLY,
            Access::ReadWrite => libc::O_RDWR | libc::O_CREAT,
        } | libc::O_CLOEXEC;
        let fd = unsafe {
            from_ret(
                syscalls::raw_syscall!(
                    Sysno::openat,
                    libc::AT_FDCWD,
                    name.as_ptr(),
                    flags,
                    CREATE_MODE
                ),
                "openat",
            )?
        } as RawFd;
        handle.fd = Some(fd);

        let mut stat = MaybeUninit::<libc::stat>::uninit();
        unsafe {
            from_ret(
                syscalls::raw_syscall!(Sysno::fstat, fd, stat.as_mut_ptr()),
                "fstat",
            )?;
        }
        let stat = unsafe { stat.assume_init() };
        if stat.st_mode & libc::S_IFMT == libc::S_IFDIR {
            return Err(os_error("openat", libc::EISDIR));
        }

        let extent = size.resolve(stat.st_size as u64, access)?;
        if extent.grow {
            unsafe {
                from_ret(
                    syscalls::raw_syscall!(Sysno::ftruncate, fd, extent.len),
                    "ftruncate",
                )?;
            }
            #[cfg(feature = "log")]
            log::trace!(
                "[Grow] fd: {}, from: {}, to: {}",
                fd,
                stat.st_size,
                extent.len
            );
        }

        let ptr = mmap(extent.len, access.prot().bits(), fd)?;
        handle.addr = Some(mapped_base(ptr, extent.len, |ptr, len| unsafe {
            let _ = syscalls::raw_syscall!(Sysno::munmap, ptr, len);
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
                let ret = unsafe {
                    syscalls::raw_syscall!(Sysno::msync, addr.as_ptr(), len, libc::MS_SYNC)
                };
                if let Some(code) = ret_errno(ret) {
                    teardown_failed("msync", code);
                }
            }
            let ret = unsafe { syscalls::raw_syscall!(Sysno::munmap, addr.as_ptr(), len) };
            if let Some(code) = ret_errno(ret) {
                teardown_failed("munmap", code);
            }
            #[cfg(feature = "log")]
            log::trace!("[Munmap] address: {:p}, length: {}", addr, len);
        }

        if let Some(fd) = handle.fd.take() {
            let ret = unsafe { syscalls::raw_syscall!(Sysno::close, fd) };
            if let Some(code) = ret_errno(ret) {
                teardown_failed("close", code);
            }
        }
    }

    unsafe fn flush(handle: &NativeHandle, len: usize) -> Result<()> {
        if let Some(addr) = handle.addr {
            unsafe {
                from_ret(
                    syscalls::raw_syscall!(Sysno::msync, addr.as_ptr(), len, libc::MS_SYNC),
                    "msync",
                )?;
            }
        }
        Ok(())
    }

    #[inline]
    fn base(handle: &NativeHandle) -> Option<NonNull<u8>> {
        handle.addr.map(NonNull::cast)
    }
}
