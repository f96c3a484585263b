use super::teardown_failed;
use crate::{
    Error, ErrorKind, Result,
    error::{mmio_error, os_error},
    mmap::{Access, MapSize, Mmap},
};
use core::{
    ffi::c_void,
    ptr::{NonNull, null, null_mut},
};
use std::{os::windows::ffi::OsStrExt, path::Path};
use windows_sys::Win32::{
    Foundation::{
        CloseHandle, GENERIC_READ, GENERIC_WRITE, GetLastError, HANDLE, INVALID_HANDLE_VALUE,
    },
    Storage::FileSystem::{
        CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, FlushFileBuffers,
        GetFileSizeEx, OPEN_ALWAYS, OPEN_EXISTING,
    },
    System::Memory::{
        CreateFileMappingW, FILE_MAP_READ, FILE_MAP_WRITE, FlushViewOfFile,
        MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile, PAGE_READONLY, PAGE_READWRITE,
        UnmapViewOfFile,
    },
};

/// An implementation of Mmap trait
pub struct DefaultMmap;

/// The raw resources behind a mapping on Windows: the file, the
/// file-mapping object and the mapped view.
///
/// Callers must not close these handles or unmap the view; the owning
/// [`MappedFile`](crate::MappedFile) does that.
#[derive(Debug, Default)]
pub struct NativeHandle {
    file: Option<HANDLE>,
    mapping: Option<HANDLE>,
    view: Option<NonNull<c_void>>,
}

// SAFETY: kernel handles may be used from any thread.
unsafe impl Send for NativeHandle {}
unsafe impl Sync for NativeHandle {}

impl NativeHandle {
    /// The file handle returned by `CreateFileW`, if any.
    #[inline]
    pub fn file(&self) -> Option<HANDLE> {
        self.file
    }

    /// The handle returned by `CreateFileMappingW`, if any.
    #[inline]
    pub fn file_mapping_object(&self) -> Option<HANDLE> {
        self.mapping
    }

    /// Base address of the mapped view, if any.
    #[inline]
    pub fn base_address(&self) -> Option<NonNull<c_void>> {
        self.view
    }
}

#[inline]
fn last_error_code() -> i32 {
    unsafe { GetLastError() as i32 }
}

#[inline]
fn last_os_error(op: &'static str) -> Error {
    os_error(op, last_error_code())
}

fn wide_path(path: &Path) -> Result<Vec<u16>> {
    let mut wide: Vec<u16> = path.as_os_str().encode_wide().collect();
    if wide.contains(&0) {
        return Err(mmio_error(
            "CreateFileW",
            ErrorKind::InvalidFilename,
            "path contains an interior nul character",
        ));
    }
    wide.push(0);
    Ok(wide)
}

impl Mmap for DefaultMmap {
    type Handle = NativeHandle;

    fn map(
        handle: &mut NativeHandle,
        path: &Path,
        access: Access,
        size: MapSize,
    ) -> Result<usize> {
        debug_assert!(handle.file.is_none() && handle.mapping.is_none() && handle.view.is_none());
        let wide = wide_path(path)?;
        let (desired, share, disposition) = match access {
            Access::ReadOnly => (GENERIC_READ, FILE_SHARE_READ, OPEN_EXISTING),
            Access::ReadWrite => (
                GENERIC_READ | GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                OPEN_ALWAYS,
            ),
        };
        let file = unsafe {
            CreateFileW(
                wide.as_ptr(),
                desired,
                share,
                null(),
                disposition,
                FILE_ATTRIBUTE_NORMAL,
                null_mut(),
            )
        };
        if file == INVALID_HANDLE_VALUE {
            return Err(last_os_error("CreateFileW"));
        }
        handle.file = Some(file);

        let mut file_len = 0i64;
        if unsafe { GetFileSizeEx(file, &mut file_len) } == 0 {
            return Err(last_os_error("GetFileSizeEx"));
        }

        // CreateFileMappingW extends a writable file to the maximum size it is
        // given, so growth needs no separate step here.
        let extent = size.resolve(file_len as u64, access)?;
        let (page, view_access) = match access {
            Access::ReadOnly => (PAGE_READONLY, FILE_MAP_READ),
            Access::ReadWrite => (PAGE_READWRITE, FILE_MAP_READ | FILE_MAP_WRITE),
        };
        let len = extent.len as u64;
        let mapping = unsafe {
            CreateFileMappingW(
                file,
                null(),
                page,
                (len >> 32) as u32,
                len as u32,
                null(),
            )
        };
        if mapping.is_null() {
            return Err(last_os_error("CreateFileMappingW"));
        }
        handle.mapping = Some(mapping);

        let view = unsafe { MapViewOfFile(mapping, view_access, 0, 0, extent.len) };
        let Some(view) = NonNull::new(view.Value) else {
            return Err(last_os_error("MapViewOfFile"));
        };
        handle.view = Some(view);

        #[cfg(feature = "log")]
        log::debug!(
            "Mapped file at address: {:p}, length: {}, grown: {}, access: {:?}",
            view,
            extent.len,
            extent.grow,
            access
        );
        Ok(extent.len)
    }

    unsafe fn unmap(handle: &mut NativeHandle, _len: usize, access: Access) {
        if let Some(view) = handle.view.take() {
            if access.is_writable() {
                if unsafe { FlushViewOfFile(view.as_ptr(), 0) } == 0 {
                    teardown_failed("FlushViewOfFile", last_error_code());
                }
                if let Some(file) = handle.file {
                    if unsafe { FlushFileBuffers(file) } == 0 {
                        teardown_failed("FlushFileBuffers", last_error_code());
                    }
                }
            }
            let addr = MEMORY_MAPPED_VIEW_ADDRESS {
                Value: view.as_ptr(),
            };
            if unsafe { UnmapViewOfFile(addr) } == 0 {
                teardown_failed("UnmapViewOfFile", last_error_code());
            }
        }

        if let Some(mapping) = handle.mapping.take() {
            if unsafe { CloseHandle(mapping) } == 0 {
                teardown_failed("CloseHandle", last_error_code());
            }
        }

        if let Some(file) = handle.file.take() {
            if unsafe { CloseHandle(file) } == 0 {
                teardown_failed("CloseHandle", last_error_code());
            }
        }
    }

    unsafe fn flush(handle: &NativeHandle, _len: usize) -> Result<()> {
        if let Some(view) = handle.view {
            if unsafe { FlushViewOfFile(view.as_ptr(), 0) } == 0 {
                return Err(last_os_error("FlushViewOfFile"));
            }
            if let Some(file) = handle.file {
                if unsafe { FlushFileBuffers(file) } == 0 {
                    return Err(last_os_error("FlushFileBuffers"));
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn base(handle: &NativeHandle) -> Option<NonNull<u8>> {
        handle.view.map(NonNull::cast)
    }
}
