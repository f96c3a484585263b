//! Errors reported by `mmio`.
//!
//! Every failure is described by an [`ErrorKind`], a portable category that
//! is the same on every platform, so callers can tell "not found" from
//! "permission denied" without looking at errno or `GetLastError` values.

#[cfg(unix)]
mod errno;
mod kind;
#[cfg(windows)]
mod win32;

pub use kind::ErrorKind;

use core::fmt::{self, Debug, Display};
use std::io;

/// An error raised while establishing a mapping.
///
/// Carries the portable [`ErrorKind`], the name of the native call that
/// failed and, when the failure came from the OS, the raw native code.
/// There is no public constructor: only `mmio` produces these.
#[derive(Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    op: &'static str,
    code: Option<i32>,
    detail: Option<&'static str>,
}

impl Error {
    /// The portable category of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The native errno or `GetLastError` value, if the OS reported one.
    #[inline]
    pub fn raw_os_error(&self) -> Option<i32> {
        self.code
    }

    /// The native operation that failed, such as `"open"` or `"CreateFileMappingW"`.
    #[inline]
    pub fn operation(&self) -> &'static str {
        self.op
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Error");
        s.field("kind", &self.kind).field("op", &self.op);
        if let Some(code) = self.code {
            s.field("code", &code);
        }
        if let Some(detail) = self.detail {
            s.field("detail", &detail);
        }
        s.finish()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.op, self.kind)?;
        if let Some(detail) = self.detail {
            write!(f, ": {detail}")?;
        }
        if let Some(code) = self.code {
            write!(f, " (os error {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(err.kind.into(), err)
    }
}

/// Creates an error from a native code reported by the OS.
#[cold]
#[inline(never)]
pub(crate) fn os_error(op: &'static str, code: i32) -> Error {
    Error {
        kind: ErrorKind::from_raw_os_error(code),
        op,
        code: Some(code),
        detail: None,
    }
}

/// Creates an error detected by `mmio` itself, before any native call failed.
#[cold]
#[inline(never)]
pub(crate) fn mmio_error(op: &'static str, kind: ErrorKind, detail: &'static str) -> Error {
    Error {
        kind,
        op,
        code: None,
        detail: Some(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_operation_and_code() {
        let err = mmio_error("mmap", ErrorKind::InvalidInput, "cannot map an empty file");
        assert_eq!(
            err.to_string(),
            "mmap failed: invalid input parameter: cannot map an empty file"
        );
        assert_eq!(err.raw_os_error(), None);
    }

    #[cfg(unix)]
    #[test]
    fn os_error_keeps_native_code() {
        let err = os_error("open", libc::ENOENT);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.raw_os_error(), Some(libc::ENOENT));
        assert_eq!(err.operation(), "open");
        assert!(err.to_string().ends_with(&format!("(os error {})", libc::ENOENT)));
    }

    #[cfg(unix)]
    #[test]
    fn converts_into_io_error() {
        let err: io::Error = os_error("open", libc::EACCES).into();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        let inner = err.get_ref().and_then(|e| e.downcast_ref::<Error>());
        assert_eq!(inner.map(Error::kind), Some(ErrorKind::PermissionDenied));
    }
}
