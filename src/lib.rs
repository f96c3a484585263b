//! # mmio
//! A `portable`, `lightweight` library for memory mapping files.
//! ## Usage
//! A [`MappedFile`] maps a whole file, or a leading part of it, into the
//! address space of the process, either read-only ([`MappedFileSource`]) or
//! read-write ([`MappedFileSink`]). The mapping is released when the handle is
//! closed or dropped, and read-write mappings are flushed to disk first.
//!
//! Failures are reported with a portable [`ErrorKind`], so the same error
//! handling works on unix and Windows.
//! ## Example
//! ```no_run
//! use mmio::{ErrorKind, MapSize, MappedFileSource};
//!
//! let mut file = MappedFileSource::new();
//! let result = file.try_open("Cargo.toml", MapSize::Dynamic);
//! match result.kind() {
//!     None => println!("{} bytes mapped", file.len()),
//!     Some(ErrorKind::NotFound) => println!("no such file"),
//!     Some(kind) => println!("cannot map: {kind}"),
//! }
//! ```
//! ## Features
//! - `log` (default): report mapping activity through the `log` facade.
//! - `use-syscall`: on Linux, call the kernel directly instead of going through libc.

mod error;
mod mapped_file;
pub mod mmap;
mod os;

pub use error::{Error, ErrorKind};
pub use mapped_file::{MappedFile, MappedFileSink, MappedFileSource, OpenResult};
pub use mmap::{MapMode, MapSize, NativeHandle, ReadOnly, ReadWrite};

/// A type alias for `Result`s which return `mmio::Error` on failure.
pub type Result<T> = core::result::Result<T, Error>;
