//! In-memory host.
//!
//! A flat namespace of byte vectors plus a console buffer. Useful for
//! exercising programs without touching the disk, and for injecting faults
//! the real filesystem will not produce on demand.

use std::collections::HashMap;

use crate::fd::DescriptorTable;
use crate::host::{validate_flags, validate_name, Host, OpenFlags, PAGE_SIZE};
use crate::io::{STDIN, STDOUT};
use crate::syscall::{SyscallError, SyscallResult};

enum MemStream {
    ConsoleIn,
    ConsoleOut,
    File {
        name: String,
        pos: usize,
        readable: bool,
        writable: bool,
    },
}

/// Host whose files live in a `HashMap`.
#[derive(Default)]
pub struct MemHost {
    files: HashMap<String, Vec<u8>>,
    table: DescriptorTable<MemStream>,
    console: Vec<u8>,
    read_fault: Option<SyscallError>,
}

impl MemHost {
    /// Create an empty namespace with the console installed at descriptors
    /// 0 and 1. Console input is always at end of file.
    pub fn new() -> Self {
        let mut host = Self::default();
        let _ = host.table.install(STDIN, MemStream::ConsoleIn);
        let _ = host.table.install(STDOUT, MemStream::ConsoleOut);
        host
    }

    /// Add or replace a file.
    pub fn insert(&mut self, name: &str, contents: impl Into<Vec<u8>>) {
        self.files.insert(name.to_string(), contents.into());
    }

    /// Make every subsequent file read fail with `err`.
    pub fn fail_reads_with(&mut self, err: SyscallError) {
        self.read_fault = Some(err);
    }

    /// Everything printed so far.
    pub fn console(&self) -> &[u8] {
        &self.console
    }

    /// Console output as text, lossily decoded.
    pub fn console_text(&self) -> String {
        String::from_utf8_lossy(&self.console).into_owned()
    }

    /// Contents of a file, if it exists.
    pub fn contents(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Number of open descriptors, console included.
    pub fn open_count(&self) -> usize {
        self.table.open_count()
    }
}

impl Host for MemHost {
    fn open(&mut self, name: &str, flags: OpenFlags) -> SyscallResult {
        validate_name(name)?;
        validate_flags(flags)?;

        match self.files.get_mut(name) {
            Some(data) => {
                if flags.contains(OpenFlags::TRUNCATE) {
                    data.clear();
                }
            }
            None if flags.contains(OpenFlags::CREATE) => {
                self.files.insert(name.to_string(), Vec::new());
            }
            None => return Err(SyscallError::NotFound),
        }

        self.table.allocate(MemStream::File {
            name: name.to_string(),
            pos: 0,
            readable: flags.contains(OpenFlags::READ),
            writable: flags.contains(OpenFlags::WRITE),
        })
    }

    fn read(&mut self, fd: u64, buf: &mut [u8]) -> SyscallResult {
        let (name, pos) = match self.table.get_mut(fd)? {
            MemStream::File {
                name,
                pos,
                readable: true,
                ..
            } => (name, pos),
            MemStream::ConsoleIn => return Ok(0),
            _ => return Err(SyscallError::BadDescriptor),
        };
        if let Some(err) = self.read_fault {
            return Err(err);
        }

        let data = self.files.get(name.as_str()).ok_or(SyscallError::IoError)?;
        let mut total = 0;
        while total < buf.len() && *pos < data.len() {
            let chunk = PAGE_SIZE
                .min(buf.len() - total)
                .min(data.len() - *pos);
            buf[total..total + chunk].copy_from_slice(&data[*pos..*pos + chunk]);
            total += chunk;
            *pos += chunk;
        }
        Ok(total as u64)
    }

    fn write(&mut self, fd: u64, buf: &[u8]) -> SyscallResult {
        match self.table.get_mut(fd)? {
            MemStream::ConsoleOut => {
                self.console.extend_from_slice(buf);
                Ok(buf.len() as u64)
            }
            MemStream::File {
                name,
                pos,
                writable: true,
                ..
            } => {
                let data = self
                    .files
                    .get_mut(name.as_str())
                    .ok_or(SyscallError::IoError)?;
                let end = *pos + buf.len();
                if data.len() < end {
                    data.resize(end, 0);
                }
                data[*pos..end].copy_from_slice(buf);
                *pos = end;
                Ok(buf.len() as u64)
            }
            _ => Err(SyscallError::BadDescriptor),
        }
    }

    fn close(&mut self, fd: u64) -> SyscallResult {
        self.table.release(fd)?;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_read_then_eof() {
        let mut host = MemHost::new();
        host.insert("write1.c", vec![b'a'; 2500]);
        let fd = host.open("write1.c", OpenFlags::READ).unwrap();
        assert_eq!(fd, 2);

        let mut buf = vec![0u8; 102400];
        assert_eq!(host.read(fd, &mut buf), Ok(2500));
        assert_eq!(host.read(fd, &mut buf), Ok(0));
    }

    #[test]
    fn reads_resume_at_position() {
        let mut host = MemHost::new();
        host.insert("f", b"abcdef".to_vec());
        let fd = host.open("f", OpenFlags::READ).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(host.read(fd, &mut buf), Ok(4));
        assert_eq!(&buf, b"abcd");
        assert_eq!(host.read(fd, &mut buf), Ok(2));
        assert_eq!(&buf[..2], b"ef");
    }

    #[test]
    fn fault_injection_applies_to_file_reads() {
        let mut host = MemHost::new();
        host.insert("f", b"abc".to_vec());
        let fd = host.open("f", OpenFlags::READ).unwrap();
        host.fail_reads_with(SyscallError::IoError);
        let mut buf = [0u8; 4];
        assert_eq!(host.read(fd, &mut buf), Err(SyscallError::IoError));
        assert_eq!(host.read(99, &mut buf), Err(SyscallError::BadDescriptor));
    }

    #[test]
    fn create_write_and_console() {
        let mut host = MemHost::new();
        let fd = host
            .open("new", OpenFlags::WRITE | OpenFlags::CREATE)
            .unwrap();
        assert_eq!(host.write(fd, b"xyz"), Ok(3));
        assert_eq!(host.contents("new"), Some(&b"xyz"[..]));
        assert_eq!(host.write(STDOUT, b"hi\n"), Ok(3));
        assert_eq!(host.console_text(), "hi\n");
        assert_eq!(host.close(fd), Ok(0));
        assert_eq!(host.open_count(), 2);
    }

    #[test]
    fn missing_file_is_not_found() {
        let mut host = MemHost::new();
        assert_eq!(host.open("nope", OpenFlags::READ), Err(SyscallError::NotFound));
    }
}
