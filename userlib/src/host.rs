//! The host seam.
//!
//! A `Host` supplies the file system calls a user program consumes. Programs
//! are written against the trait so they run unchanged on the real
//! filesystem (`StdHost`) or on an in-memory namespace (`MemHost`).

use std::io::{ErrorKind, Read};
use std::path::{Component, Path};

use crate::syscall::{SyscallError, SyscallResult};

/// Longest file name accepted by `open`, in bytes.
pub const MAX_NAME_LEN: usize = 256;

/// Transfer unit for reads. Large reads are split into pages of this size.
pub const PAGE_SIZE: usize = 1024;

bitflags::bitflags! {
    /// Flags for opening files.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        /// Open for reading.
        const READ = 0x0001;
        /// Open for writing.
        const WRITE = 0x0002;
        /// Create if not exists.
        const CREATE = 0x0004;
        /// Truncate to zero length.
        const TRUNCATE = 0x0008;
    }
}

/// File system calls supplied by the environment.
///
/// Descriptors are plain `u64` slot numbers. Every call returns a
/// `SyscallResult`; `syscall::to_raw` recovers the C-style sentinel.
pub trait Host {
    /// Open an existing file (or create one, with `CREATE`).
    fn open(&mut self, name: &str, flags: OpenFlags) -> SyscallResult;

    /// Read up to `buf.len()` bytes. Returns fewer at end of file, 0 at EOF.
    fn read(&mut self, fd: u64, buf: &mut [u8]) -> SyscallResult;

    /// Write `buf`, returning the number of bytes written.
    fn write(&mut self, fd: u64, buf: &[u8]) -> SyscallResult;

    /// Release a descriptor.
    fn close(&mut self, fd: u64) -> SyscallResult;
}

/// Check a file name before it reaches the namespace.
///
/// Names are relative to the host's root; a root or drive prefix would
/// escape it and is rejected.
pub fn validate_name(name: &str) -> Result<(), SyscallError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN || name.contains('\0') {
        return Err(SyscallError::InvalidArgument);
    }
    let anchored = Path::new(name)
        .components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)));
    if anchored {
        return Err(SyscallError::InvalidArgument);
    }
    Ok(())
}

/// Check that a flag set names at least one access mode.
pub fn validate_flags(flags: OpenFlags) -> Result<(), SyscallError> {
    if !flags.intersects(OpenFlags::READ | OpenFlags::WRITE) {
        return Err(SyscallError::InvalidArgument);
    }
    if flags.contains(OpenFlags::TRUNCATE) && !flags.contains(OpenFlags::WRITE) {
        return Err(SyscallError::InvalidArgument);
    }
    Ok(())
}

/// Fill `buf` from `src` page by page until it is full or `src` is exhausted.
///
/// A source that ends early yields a short count; an empty source yields 0.
pub fn read_paged<R: Read + ?Sized>(src: &mut R, buf: &mut [u8]) -> SyscallResult {
    let mut total = 0;
    while total < buf.len() {
        let end = (total + PAGE_SIZE).min(buf.len());
        match src.read(&mut buf[total..end]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                log::debug!("read failed after {} bytes: {}", total, e);
                return Err(SyscallError::from(e));
            }
        }
    }
    Ok(total as u64)
}

/// Issue a single read against `src`, returning whatever it has available.
///
/// Used for interactive streams, where waiting for a full buffer would block
/// until end of input.
pub fn read_once<R: Read + ?Sized>(src: &mut R, buf: &mut [u8]) -> SyscallResult {
    loop {
        match src.read(buf) {
            Ok(n) => return Ok(n as u64),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(SyscallError::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn names_are_validated() {
        assert!(validate_name("write1.c").is_ok());
        assert_eq!(validate_name(""), Err(SyscallError::InvalidArgument));
        assert_eq!(validate_name("a\0b"), Err(SyscallError::InvalidArgument));
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(validate_name(&long), Err(SyscallError::InvalidArgument));
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn absolute_names_are_rejected() {
        assert_eq!(validate_name("/etc/passwd"), Err(SyscallError::InvalidArgument));
        assert_eq!(validate_name("/"), Err(SyscallError::InvalidArgument));
        assert!(validate_name("fixtures/write1.c").is_ok());
        assert!(validate_name("./write1.c").is_ok());
    }

    #[test]
    fn flags_need_an_access_mode() {
        assert!(validate_flags(OpenFlags::READ).is_ok());
        assert!(validate_flags(OpenFlags::WRITE | OpenFlags::CREATE).is_ok());
        assert_eq!(
            validate_flags(OpenFlags::CREATE),
            Err(SyscallError::InvalidArgument)
        );
        assert_eq!(
            validate_flags(OpenFlags::READ | OpenFlags::TRUNCATE),
            Err(SyscallError::InvalidArgument)
        );
    }

    #[test]
    fn paged_read_stops_at_end_of_source() {
        let data = vec![7u8; 3000];
        let mut buf = vec![0u8; 102400];
        let n = read_paged(&mut Cursor::new(&data), &mut buf).unwrap();
        assert_eq!(n, 3000);
        assert!(buf[..3000].iter().all(|&b| b == 7));
    }

    #[test]
    fn paged_read_fills_small_buffer() {
        let data = vec![1u8; 5000];
        let mut buf = vec![0u8; 2500];
        let mut src = Cursor::new(&data);
        assert_eq!(read_paged(&mut src, &mut buf), Ok(2500));
        assert_eq!(read_paged(&mut src, &mut buf), Ok(2500));
        assert_eq!(read_paged(&mut src, &mut buf), Ok(0));
    }

    struct Flaky {
        interrupted: bool,
    }

    impl Read for Flaky {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            Err(std::io::Error::new(ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn interrupted_reads_retry_and_errors_surface() {
        let mut buf = [0u8; 16];
        let mut src = Flaky { interrupted: false };
        assert_eq!(read_paged(&mut src, &mut buf), Err(SyscallError::IoError));
        assert!(src.interrupted);
    }

    /// Hands out at most `chunk` bytes per call, like a terminal line.
    struct Trickle {
        data: Vec<u8>,
        chunk: usize,
        calls: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.calls += 1;
            let n = self.chunk.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data.drain(..n);
            Ok(n)
        }
    }

    #[test]
    fn single_read_returns_what_is_available() {
        let mut src = Trickle {
            data: b"hello\nworld\n".to_vec(),
            chunk: 6,
            calls: 0,
        };
        let mut buf = [0u8; 1024];
        assert_eq!(read_once(&mut src, &mut buf), Ok(6));
        assert_eq!(&buf[..6], b"hello\n");
        assert_eq!(src.calls, 1);
    }

    #[test]
    fn single_read_retries_interrupts() {
        let mut buf = [0u8; 16];
        let mut src = Flaky { interrupted: false };
        assert_eq!(read_once(&mut src, &mut buf), Err(SyscallError::IoError));
        assert!(src.interrupted);
    }
}
