//! System call error codes and the raw sentinel convention.
//!
//! Every call returns a raw `i64`: non-negative values are results, negative
//! values are error sentinels. `SyscallResult` is the typed view of that
//! convention; `convert_result` and `to_raw` move between the two.

use core::fmt;

/// System call error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum SyscallError {
    /// Operation not permitted.
    PermissionDenied = -1,
    /// No such file or directory.
    NotFound = -2,
    /// I/O error.
    IoError = -5,
    /// Descriptor is not open, out of range, or a sentinel.
    BadDescriptor = -9,
    /// Operation would block.
    WouldBlock = -11,
    /// Out of memory.
    OutOfMemory = -12,
    /// File already exists.
    AlreadyExists = -17,
    /// Name refers to a directory.
    IsDirectory = -21,
    /// Invalid argument.
    InvalidArgument = -22,
    /// Descriptor table is full.
    TooManyOpenFiles = -24,
    /// Unknown error.
    Unknown = -255,
}

impl SyscallError {
    /// Convert raw return value to error.
    pub fn from_raw(val: i64) -> Self {
        match val {
            -1 => Self::PermissionDenied,
            -2 => Self::NotFound,
            -5 => Self::IoError,
            -9 => Self::BadDescriptor,
            -11 => Self::WouldBlock,
            -12 => Self::OutOfMemory,
            -17 => Self::AlreadyExists,
            -21 => Self::IsDirectory,
            -22 => Self::InvalidArgument,
            -24 => Self::TooManyOpenFiles,
            _ => Self::Unknown,
        }
    }

    /// The negative sentinel carried in a raw return value.
    pub const fn as_raw(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for SyscallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::PermissionDenied => "permission denied",
            Self::NotFound => "no such file or directory",
            Self::IoError => "i/o error",
            Self::BadDescriptor => "bad file descriptor",
            Self::WouldBlock => "operation would block",
            Self::OutOfMemory => "out of memory",
            Self::AlreadyExists => "file exists",
            Self::IsDirectory => "is a directory",
            Self::InvalidArgument => "invalid argument",
            Self::TooManyOpenFiles => "too many open files",
            Self::Unknown => "unknown error",
        };
        write!(f, "{} ({})", msg, self.as_raw())
    }
}

impl std::error::Error for SyscallError {}

impl From<std::io::Error> for SyscallError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::PermissionDenied => Self::PermissionDenied,
            ErrorKind::AlreadyExists => Self::AlreadyExists,
            ErrorKind::WouldBlock => Self::WouldBlock,
            ErrorKind::InvalidInput => Self::InvalidArgument,
            ErrorKind::OutOfMemory => Self::OutOfMemory,
            _ => Self::IoError,
        }
    }
}

/// Result type for system calls.
pub type SyscallResult = Result<u64, SyscallError>;

/// Convert raw syscall return value to Result.
#[inline]
pub fn convert_result(ret: i64) -> SyscallResult {
    if ret >= 0 {
        Ok(ret as u64)
    } else {
        Err(SyscallError::from_raw(ret))
    }
}

/// Collapse a Result back into the raw return value.
#[inline]
pub fn to_raw(result: SyscallResult) -> i64 {
    match result {
        Ok(val) => val as i64,
        Err(e) => e.as_raw(),
    }
}

/// Interpret a raw descriptor value. Negative sentinels are never valid
/// descriptors.
#[inline]
pub fn descriptor_from_raw(raw: i64) -> SyscallResult {
    if raw < 0 {
        Err(SyscallError::BadDescriptor)
    } else {
        Ok(raw as u64)
    }
}
