cfg_if::cfg_if! {
    if #[cfg(windows)] {
        pub(crate) mod windows;
        pub use windows::{DefaultMmap, NativeHandle};
    } else if #[cfg(all(
        feature = "use-syscall",
        target_os = "linux",
        any(
            target_arch = "x86_64",
            target_arch = "aarch64",
            target_arch = "riscv64",
            target_arch = "loongarch64"
        )
    ))] {
        // 32-bit kernels only offer mmap2/fstat64 with their own stat layout;
        // those targets go through libc
        pub(crate) mod linux_syscall;
        pub use linux_syscall::{DefaultMmap, NativeHandle};
    } else if #[cfg(unix)] {
        pub(crate) mod unix;
        pub use unix::{DefaultMmap, NativeHandle};
    } else {
        compile_error!("mmio only supports unix and windows targets");
    }
}

/// Reports a failed release of a previously live resource.
///
/// There is nothing a caller can do about it, so it is never returned.
#[cold]
#[inline(never)]
pub(crate) fn teardown_failed(op: &'static str, code: i32) {
    #[cfg(feature = "log")]
    log::warn!(
        "[Unmap] {} failed during teardown: {} (os error {})",
        op,
        crate::ErrorKind::from_raw_os_error(code),
        code
    );
    debug_assert!(false, "{op} failed during teardown (os error {code})");
}

#[cfg(unix)]
pub(crate) fn c_path(path: &std::path::Path) -> crate::Result<std::ffi::CString> {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        crate::error::mmio_error(
            "open",
            crate::ErrorKind::InvalidFilename,
            "path contains an interior nul byte",
        )
    })
}

/// Checks the address a successful `mmap` returned.
///
/// No `MAP_FIXED` hint is ever given, but a kernel with `mmap_min_addr = 0`
/// may still place the mapping at address zero. Such a mapping cannot be
/// tracked, so it is handed to `release` and the open fails.
#[cfg(unix)]
pub(crate) fn mapped_base(
    ptr: *mut core::ffi::c_void,
    len: usize,
    release: impl FnOnce(*mut core::ffi::c_void, usize),
) -> crate::Result<core::ptr::NonNull<core::ffi::c_void>> {
    core::ptr::NonNull::new(ptr).ok_or_else(|| {
        release(ptr, len);
        crate::error::mmio_error(
            "mmap",
            crate::ErrorKind::Uncategorized,
            "file was mapped at address zero",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::DefaultMmap;

    #[test]
    fn raw_syscalls_only_on_supported_linux_arches() {
        let backend = core::any::type_name::<DefaultMmap>();
        let raw = cfg!(all(
            feature = "use-syscall",
            target_os = "linux",
            any(
                target_arch = "x86_64",
                target_arch = "aarch64",
                target_arch = "riscv64",
                target_arch = "loongarch64"
            )
        ));
        assert_eq!(backend.contains("linux_syscall"), raw, "{backend}");
        #[cfg(unix)]
        assert!(raw || backend.contains("os::unix"), "{backend}");
        #[cfg(windows)]
        assert!(backend.contains("os::windows"), "{backend}");
    }

    #[cfg(unix)]
    #[test]
    fn address_zero_is_released_and_refused() {
        use crate::ErrorKind;
        use core::ptr::null_mut;

        let mut released = None;
        let err = super::mapped_base(null_mut(), 4096, |ptr, len| released = Some((ptr, len)))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Uncategorized);
        assert_eq!(err.operation(), "mmap");
        assert_eq!(released, Some((null_mut(), 4096)));
    }

    #[cfg(unix)]
    #[test]
    fn live_address_is_kept() {
        let mut byte = 0u8;
        let ptr = (&mut byte as *mut u8).cast();
        let mut released = false;
        let base = super::mapped_base(ptr, 1, |_, _| released = true).unwrap();
        assert_eq!(base.as_ptr(), ptr);
        assert!(!released);
    }
}
