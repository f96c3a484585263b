use core::fmt::{self, Display};
use std::io;

/// The portable categories every native failure is sorted into.
///
/// This is the only error vocabulary `mmio` exposes. Two native codes that
/// mean roughly the same thing land in the same bucket, so converting a
/// native code to an `ErrorKind` and back is lossy. The original
/// code is still available from [`Error::raw_os_error`](crate::Error::raw_os_error).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An entity was not found, often a file.
    NotFound,
    /// The operation lacked the necessary privileges to complete.
    PermissionDenied,
    ConnectionRefused,
    ConnectionReset,
    HostUnreachable,
    NetworkUnreachable,
    ConnectionAborted,
    NotConnected,
    AddrInUse,
    AddrNotAvailable,
    NetworkDown,
    BrokenPipe,
    /// An entity already exists, often a file.
    AlreadyExists,
    WouldBlock,
    /// A filesystem object was expected to be a directory.
    NotADirectory,
    /// A file was expected but a directory was found.
    IsADirectory,
    DirectoryNotEmpty,
    /// The filesystem or storage medium is read-only.
    ReadOnlyFilesystem,
    /// Too many levels of symbolic links.
    FilesystemLoop,
    StaleNetworkFileHandle,
    /// A parameter was incorrect. Zero-length mappings end up here.
    InvalidInput,
    InvalidData,
    TimedOut,
    WriteZero,
    /// The underlying storage is full.
    StorageFull,
    NotSeekable,
    FilesystemQuotaExceeded,
    /// The file or the requested size is larger than the platform allows.
    FileTooLarge,
    ResourceBusy,
    ExecutableFileBusy,
    Deadlock,
    CrossesDevices,
    TooManyLinks,
    /// A filename was invalid: too long, or containing an interior NUL.
    InvalidFilename,
    ArgumentListTooLong,
    Interrupted,
    /// The file or filesystem does not support this kind of mapping.
    Unsupported,
    UnexpectedEof,
    /// The process ran out of memory or address space.
    OutOfMemory,
    /// The per-process or system-wide descriptor table is full.
    TooManyOpenFiles,
    /// The catch-all for native codes with no better category.
    Uncategorized,
}

impl ErrorKind {
    /// Sorts a raw native error code into a category.
    ///
    /// The code is an errno value on unix and a `GetLastError` value on
    /// Windows. Every input maps to some category; unknown codes become
    /// [`ErrorKind::Uncategorized`].
    pub fn from_raw_os_error(code: i32) -> ErrorKind {
        cfg_if::cfg_if! {
            if #[cfg(windows)] {
                super::win32::decode_error_kind(code as u32)
            } else {
                super::errno::decode_error_kind(code)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        use ErrorKind::*;
        match *self {
            NotFound => "entity not found",
            PermissionDenied => "permission denied",
            ConnectionRefused => "connection refused",
            ConnectionReset => "connection reset",
            HostUnreachable => "host unreachable",
            NetworkUnreachable => "network unreachable",
            ConnectionAborted => "connection aborted",
            NotConnected => "not connected",
            AddrInUse => "address in use",
            AddrNotAvailable => "address not available",
            NetworkDown => "network down",
            BrokenPipe => "broken pipe",
            AlreadyExists => "entity already exists",
            WouldBlock => "operation would block",
            NotADirectory => "not a directory",
            IsADirectory => "is a directory",
            DirectoryNotEmpty => "directory not empty",
            ReadOnlyFilesystem => "read-only filesystem or storage medium",
            FilesystemLoop => "filesystem loop or indirection limit",
            StaleNetworkFileHandle => "stale network file handle",
            InvalidInput => "invalid input parameter",
            InvalidData => "invalid data",
            TimedOut => "timed out",
            WriteZero => "write zero",
            StorageFull => "no storage space",
            NotSeekable => "seek on unseekable file",
            FilesystemQuotaExceeded => "filesystem quota exceeded",
            FileTooLarge => "file too large",
            ResourceBusy => "resource busy",
            ExecutableFileBusy => "executable file busy",
            Deadlock => "deadlock",
            CrossesDevices => "cross-device link or rename",
            TooManyLinks => "too many links",
            InvalidFilename => "invalid filename",
            ArgumentListTooLong => "argument list too long",
            Interrupted => "operation interrupted",
            Unsupported => "unsupported",
            UnexpectedEof => "unexpected end of file",
            OutOfMemory => "out of memory",
            TooManyOpenFiles => "too many open files",
            Uncategorized => "uncategorized error",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Re-expresses a category in the standard library's error domain.
///
/// Categories that `std` has no stable counterpart for fall back to
/// [`io::ErrorKind::Other`].
impl From<ErrorKind> for io::ErrorKind {
    fn from(kind: ErrorKind) -> io::ErrorKind {
        use io::ErrorKind as Io;
        match kind {
            ErrorKind::NotFound => Io::NotFound,
            ErrorKind::PermissionDenied => Io::PermissionDenied,
            ErrorKind::ConnectionRefused => Io::ConnectionRefused,
            ErrorKind::ConnectionReset => Io::ConnectionReset,
            ErrorKind::HostUnreachable => Io::HostUnreachable,
            ErrorKind::NetworkUnreachable => Io::NetworkUnreachable,
            ErrorKind::ConnectionAborted => Io::ConnectionAborted,
            ErrorKind::NotConnected => Io::NotConnected,
            ErrorKind::AddrInUse => Io::AddrInUse,
            ErrorKind::AddrNotAvailable => Io::AddrNotAvailable,
            ErrorKind::NetworkDown => Io::NetworkDown,
            ErrorKind::BrokenPipe => Io::BrokenPipe,
            ErrorKind::AlreadyExists => Io::AlreadyExists,
            ErrorKind::WouldBlock => Io::WouldBlock,
            ErrorKind::NotADirectory => Io::NotADirectory,
            ErrorKind::IsADirectory => Io::IsADirectory,
            ErrorKind::DirectoryNotEmpty => Io::DirectoryNotEmpty,
            ErrorKind::ReadOnlyFilesystem => Io::ReadOnlyFilesystem,
            ErrorKind::StaleNetworkFileHandle => Io::StaleNetworkFileHandle,
            ErrorKind::InvalidInput => Io::InvalidInput,
            ErrorKind::InvalidData => Io::InvalidData,
            ErrorKind::TimedOut => Io::TimedOut,
            ErrorKind::WriteZero => Io::WriteZero,
            ErrorKind::StorageFull => Io::StorageFull,
            ErrorKind::NotSeekable => Io::NotSeekable,
            ErrorKind::FileTooLarge => Io::FileTooLarge,
            ErrorKind::ResourceBusy => Io::ResourceBusy,
            ErrorKind::ExecutableFileBusy => Io::ExecutableFileBusy,
            ErrorKind::Deadlock => Io::Deadlock,
            ErrorKind::CrossesDevices => Io::CrossesDevices,
            ErrorKind::TooManyLinks => Io::TooManyLinks,
            ErrorKind::InvalidFilename => Io::InvalidFilename,
            ErrorKind::ArgumentListTooLong => Io::ArgumentListTooLong,
            ErrorKind::Interrupted => Io::Interrupted,
            ErrorKind::Unsupported => Io::Unsupported,
            ErrorKind::UnexpectedEof => Io::UnexpectedEof,
            ErrorKind::OutOfMemory => Io::OutOfMemory,
            // no stable counterpart in std
            ErrorKind::FilesystemLoop
            | ErrorKind::FilesystemQuotaExceeded
            | ErrorKind::TooManyOpenFiles
            | ErrorKind::Uncategorized => Io::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_domain_keeps_common_categories() {
        assert_eq!(io::ErrorKind::from(ErrorKind::NotFound), io::ErrorKind::NotFound);
        assert_eq!(
            io::ErrorKind::from(ErrorKind::PermissionDenied),
            io::ErrorKind::PermissionDenied
        );
        assert_eq!(
            io::ErrorKind::from(ErrorKind::IsADirectory),
            io::ErrorKind::IsADirectory
        );
    }

    #[test]
    fn std_domain_falls_back_to_other() {
        assert_eq!(io::ErrorKind::from(ErrorKind::Uncategorized), io::ErrorKind::Other);
        assert_eq!(io::ErrorKind::from(ErrorKind::TooManyOpenFiles), io::ErrorKind::Other);
        assert_eq!(io::ErrorKind::from(ErrorKind::FilesystemLoop), io::ErrorKind::Other);
    }

    #[test]
    fn display_uses_description() {
        assert_eq!(ErrorKind::NotFound.to_string(), "entity not found");
        assert_eq!(ErrorKind::Uncategorized.to_string(), "uncategorized error");
    }
}
