//! I/O functions for user programs.
//!
//! Thin wrappers that route the classic calls through a `Host`.

use crate::host::{Host, OpenFlags};
use crate::syscall::SyscallResult;

/// File descriptor for stdin.
pub const STDIN: u64 = 0;
/// File descriptor for stdout.
pub const STDOUT: u64 = 1;

/// Open an existing file for reading.
pub fn open<H: Host + ?Sized>(host: &mut H, name: &str) -> SyscallResult {
    host.open(name, OpenFlags::READ)
}

/// Create a file (or truncate an existing one) for writing.
pub fn creat<H: Host + ?Sized>(host: &mut H, name: &str) -> SyscallResult {
    host.open(
        name,
        OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
    )
}

/// Read bytes from a file descriptor.
pub fn read<H: Host + ?Sized>(host: &mut H, fd: u64, buf: &mut [u8]) -> SyscallResult {
    host.read(fd, buf)
}

/// Write bytes to a file descriptor.
pub fn write<H: Host + ?Sized>(host: &mut H, fd: u64, buf: &[u8]) -> SyscallResult {
    host.write(fd, buf)
}

/// Close a file descriptor.
pub fn close<H: Host + ?Sized>(host: &mut H, fd: u64) -> SyscallResult {
    host.close(fd)
}

/// Print a string to stdout.
pub fn print<H: Host + ?Sized>(host: &mut H, s: &str) {
    let _ = host.write(STDOUT, s.as_bytes());
}

/// Print a string to stdout with a newline.
pub fn println<H: Host + ?Sized>(host: &mut H, s: &str) {
    print(host, s);
    print(host, "\n");
}
