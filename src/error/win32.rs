use super::ErrorKind;
use windows_sys::Win32::{Foundation as c, Networking::WinSock as ws};

/// Decodes a `GetLastError` value. Total: unknown values are `Uncategorized`.
pub(crate) fn decode_error_kind(code: u32) -> ErrorKind {
    use ErrorKind::*;
    match code {
        c::ERROR_ACCESS_DENIED => return PermissionDenied,
        c::ERROR_ALREADY_EXISTS => return AlreadyExists,
        c::ERROR_FILE_EXISTS => return AlreadyExists,
        c::ERROR_BROKEN_PIPE => return BrokenPipe,
        c::ERROR_FILE_NOT_FOUND
        | c::ERROR_PATH_NOT_FOUND
        | c::ERROR_INVALID_DRIVE
        | c::ERROR_BAD_NETPATH
        | c::ERROR_BAD_NET_NAME => return NotFound,
        c::ERROR_NO_DATA => return BrokenPipe,
        c::ERROR_INVALID_NAME | c::ERROR_BAD_PATHNAME => return InvalidFilename,
        c::ERROR_INVALID_PARAMETER => return InvalidInput,
        c::ERROR_NOT_ENOUGH_MEMORY | c::ERROR_OUTOFMEMORY => return OutOfMemory,
        c::ERROR_SEM_TIMEOUT
        | c::WAIT_TIMEOUT
        | c::ERROR_DRIVER_CANCEL_TIMEOUT
        | c::ERROR_OPERATION_ABORTED
        | c::ERROR_SERVICE_REQUEST_TIMEOUT
        | c::ERROR_COUNTER_TIMEOUT
        | c::ERROR_TIMEOUT
        | c::ERROR_RESOURCE_CALL_TIMED_OUT
        | c::ERROR_CTX_MODEM_RESPONSE_TIMEOUT
        | c::ERROR_CTX_CLIENT_QUERY_TIMEOUT
        | c::FRS_ERR_SYSVOL_POPULATE_TIMEOUT
        | c::ERROR_DS_TIMELIMIT_EXCEEDED
        | c::DNS_ERROR_RECORD_TIMED_OUT
        | c::ERROR_IPSEC_IKE_TIMED_OUT
        | c::ERROR_RUNLEVEL_SWITCH_TIMEOUT
        | c::ERROR_RUNLEVEL_SWITCH_AGENT_TIMEOUT => return TimedOut,
        c::ERROR_CALL_NOT_IMPLEMENTED => return Unsupported,
        c::ERROR_HOST_UNREACHABLE => return HostUnreachable,
        c::ERROR_NETWORK_UNREACHABLE => return NetworkUnreachable,
        c::ERROR_DIRECTORY => return NotADirectory,
        c::ERROR_DIRECTORY_NOT_SUPPORTED => return IsADirectory,
        c::ERROR_DIR_NOT_EMPTY => return DirectoryNotEmpty,
        c::ERROR_WRITE_PROTECT => return ReadOnlyFilesystem,
        c::ERROR_DISK_FULL | c::ERROR_HANDLE_DISK_FULL => return StorageFull,
        c::ERROR_SEEK_ON_DEVICE => return NotSeekable,
        c::ERROR_DISK_QUOTA_EXCEEDED => return FilesystemQuotaExceeded,
        c::ERROR_FILE_TOO_LARGE => return FileTooLarge,
        c::ERROR_BUSY => return ResourceBusy,
        c::ERROR_POSSIBLE_DEADLOCK => return Deadlock,
        c::ERROR_NOT_SAME_DEVICE => return CrossesDevices,
        c::ERROR_TOO_MANY_LINKS => return TooManyLinks,
        c::ERROR_FILENAME_EXCED_RANGE => return InvalidFilename,
        c::ERROR_TOO_MANY_OPEN_FILES => return TooManyOpenFiles,
        _ => {}
    }

    match code as i32 {
        ws::WSAEACCES => PermissionDenied,
        ws::WSAEADDRINUSE => AddrInUse,
        ws::WSAEADDRNOTAVAIL => AddrNotAvailable,
        ws::WSAECONNABORTED => ConnectionAborted,
        ws::WSAECONNREFUSED => ConnectionRefused,
        ws::WSAECONNRESET => ConnectionReset,
        ws::WSAEINVAL => InvalidInput,
        ws::WSAENOTCONN => NotConnected,
        ws::WSAEWOULDBLOCK => WouldBlock,
        ws::WSAETIMEDOUT => TimedOut,
        ws::WSAEHOSTUNREACH => HostUnreachable,
        ws::WSAENETDOWN => NetworkDown,
        ws::WSAENETUNREACH => NetworkUnreachable,
        _ => Uncategorized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_errors_have_distinct_kinds() {
        assert_eq!(decode_error_kind(c::ERROR_FILE_NOT_FOUND), ErrorKind::NotFound);
        assert_eq!(decode_error_kind(c::ERROR_PATH_NOT_FOUND), ErrorKind::NotFound);
        assert_eq!(decode_error_kind(c::ERROR_ACCESS_DENIED), ErrorKind::PermissionDenied);
        assert_eq!(decode_error_kind(c::ERROR_INVALID_PARAMETER), ErrorKind::InvalidInput);
        assert_eq!(decode_error_kind(c::ERROR_NOT_ENOUGH_MEMORY), ErrorKind::OutOfMemory);
    }

    #[test]
    fn winsock_codes_are_decoded() {
        assert_eq!(decode_error_kind(ws::WSAEACCES as u32), ErrorKind::PermissionDenied);
        assert_eq!(decode_error_kind(ws::WSAETIMEDOUT as u32), ErrorKind::TimedOut);
    }

    #[test]
    fn unknown_values_are_uncategorized() {
        assert_eq!(decode_error_kind(0), ErrorKind::Uncategorized);
        assert_eq!(decode_error_kind(u32::MAX), ErrorKind::Uncategorized);
    }
}
