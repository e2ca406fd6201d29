//! Host backed by the real filesystem.
//!
//! Names are resolved relative to a root directory. Descriptor 0 reads the
//! process's standard input, descriptor 1 writes to the console sink.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::fd::DescriptorTable;
use crate::host::{read_once, read_paged, validate_flags, validate_name, Host, OpenFlags};
use crate::io::{STDIN, STDOUT};
use crate::syscall::{SyscallError, SyscallResult};

enum Stream {
    ConsoleIn,
    ConsoleOut,
    File {
        file: fs::File,
        readable: bool,
        writable: bool,
    },
}

/// Filesystem host with a console sink of type `W`.
pub struct StdHost<W: Write> {
    root: PathBuf,
    table: DescriptorTable<Stream>,
    console: W,
}

impl StdHost<io::Stdout> {
    /// Host whose console is the process's standard output.
    pub fn with_stdout(root: impl Into<PathBuf>) -> Self {
        Self::new(root, io::stdout())
    }
}

impl<W: Write> StdHost<W> {
    /// Create a host resolving names under `root` and printing to `console`.
    pub fn new(root: impl Into<PathBuf>, console: W) -> Self {
        let mut table = DescriptorTable::new();
        // A fresh table always has both console slots free.
        let _ = table.install(STDIN, Stream::ConsoleIn);
        let _ = table.install(STDOUT, Stream::ConsoleOut);
        Self {
            root: root.into(),
            table,
            console,
        }
    }

    /// Directory names are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The console sink.
    pub fn console(&self) -> &W {
        &self.console
    }

    /// Consume the host, returning the console sink. Open files are closed.
    pub fn into_console(self) -> W {
        self.console
    }

    /// Number of open descriptors, console included.
    pub fn open_count(&self) -> usize {
        self.table.open_count()
    }
}

impl<W: Write> Host for StdHost<W> {
    fn open(&mut self, name: &str, flags: OpenFlags) -> SyscallResult {
        validate_name(name)?;
        validate_flags(flags)?;

        let path = self.root.join(name);
        if path.is_dir() {
            return Err(SyscallError::IsDirectory);
        }

        let file = OpenOptions::new()
            .read(flags.contains(OpenFlags::READ))
            .write(flags.contains(OpenFlags::WRITE))
            .create(flags.contains(OpenFlags::CREATE))
            .truncate(flags.contains(OpenFlags::TRUNCATE))
            .open(&path)
            .map_err(|e| {
                log::debug!("open {} failed: {}", path.display(), e);
                SyscallError::from(e)
            })?;

        let fd = self.table.allocate(Stream::File {
            file,
            readable: flags.contains(OpenFlags::READ),
            writable: flags.contains(OpenFlags::WRITE),
        })?;
        log::debug!("open {} -> fd {}", path.display(), fd);
        Ok(fd)
    }

    fn read(&mut self, fd: u64, buf: &mut [u8]) -> SyscallResult {
        match self.table.get_mut(fd)? {
            Stream::ConsoleIn => read_once(&mut io::stdin().lock(), buf),
            Stream::File {
                file,
                readable: true,
                ..
            } => read_paged(file, buf),
            _ => Err(SyscallError::BadDescriptor),
        }
    }

    fn write(&mut self, fd: u64, buf: &[u8]) -> SyscallResult {
        match self.table.get_mut(fd)? {
            Stream::ConsoleOut => {
                self.console.write_all(buf)?;
                self.console.flush()?;
                Ok(buf.len() as u64)
            }
            Stream::File {
                file,
                writable: true,
                ..
            } => {
                file.write_all(buf)?;
                Ok(buf.len() as u64)
            }
            _ => Err(SyscallError::BadDescriptor),
        }
    }

    fn close(&mut self, fd: u64) -> SyscallResult {
        self.table.release(fd)?;
        log::debug!("close fd {}", fd);
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fd::MAX_OPEN_FILES;

    fn fixture(contents: &[u8]) -> (tempfile::TempDir, StdHost<Vec<u8>>) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("write1.c"), contents).unwrap();
        let host = StdHost::new(dir.path(), Vec::new());
        (dir, host)
    }

    #[test]
    fn first_open_gets_descriptor_two() {
        let (_dir, mut host) = fixture(b"hello");
        assert_eq!(host.open("write1.c", OpenFlags::READ), Ok(2));
        assert_eq!(host.open("write1.c", OpenFlags::READ), Ok(3));
    }

    #[test]
    fn oversized_request_returns_file_size() {
        let contents = vec![b'x'; 50];
        let (_dir, mut host) = fixture(&contents);
        let fd = host.open("write1.c", OpenFlags::READ).unwrap();
        let mut buf = vec![0u8; 102400];
        assert_eq!(host.read(fd, &mut buf), Ok(50));
        assert_eq!(host.read(fd, &mut buf), Ok(0));
    }

    #[test]
    fn missing_file_is_not_found() {
        let (_dir, mut host) = fixture(b"");
        assert_eq!(
            host.open("absent.c", OpenFlags::READ),
            Err(SyscallError::NotFound)
        );
    }

    #[test]
    fn absolute_name_does_not_escape_root() {
        let (_dir, mut host) = fixture(b"inside");
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("outside.c");
        fs::write(&target, b"outside").unwrap();

        let name = target.to_str().unwrap();
        assert_eq!(
            host.open(name, OpenFlags::READ),
            Err(SyscallError::InvalidArgument)
        );
        assert_eq!(host.open_count(), 2);
    }

    #[test]
    fn directory_cannot_be_opened() {
        let (dir, mut host) = fixture(b"");
        fs::create_dir(dir.path().join("sub")).unwrap();
        assert_eq!(
            host.open("sub", OpenFlags::READ),
            Err(SyscallError::IsDirectory)
        );
    }

    #[test]
    fn read_on_closed_or_write_only_descriptor_fails() {
        let (_dir, mut host) = fixture(b"abc");
        let mut buf = [0u8; 8];
        assert_eq!(host.read(9, &mut buf), Err(SyscallError::BadDescriptor));
        assert_eq!(host.read(STDOUT, &mut buf), Err(SyscallError::BadDescriptor));

        let fd = host.open("write1.c", OpenFlags::READ).unwrap();
        host.close(fd).unwrap();
        assert_eq!(host.read(fd, &mut buf), Err(SyscallError::BadDescriptor));
        assert_eq!(host.close(fd), Err(SyscallError::BadDescriptor));
    }

    #[test]
    fn console_writes_reach_sink() {
        let (_dir, mut host) = fixture(b"");
        assert_eq!(host.write(STDOUT, b"Read 50\n"), Ok(8));
        assert_eq!(host.into_console(), b"Read 50\n".to_vec());
    }

    #[test]
    fn created_file_round_trips() {
        let (_dir, mut host) = fixture(b"");
        let fd = host
            .open(
                "out.txt",
                OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
            )
            .unwrap();
        assert_eq!(host.write(fd, b"0123456789"), Ok(10));
        let mut buf = [0u8; 4];
        assert_eq!(host.read(fd, &mut buf), Err(SyscallError::BadDescriptor));
        host.close(fd).unwrap();

        let fd = host.open("out.txt", OpenFlags::READ).unwrap();
        let mut buf = [0u8; 64];
        assert_eq!(host.read(fd, &mut buf), Ok(10));
        assert_eq!(&buf[..10], b"0123456789");
    }

    #[test]
    fn table_exhaustion_is_reported() {
        let (_dir, mut host) = fixture(b"x");
        for _ in 2..MAX_OPEN_FILES {
            host.open("write1.c", OpenFlags::READ).unwrap();
        }
        assert_eq!(host.open_count(), MAX_OPEN_FILES);
        assert_eq!(
            host.open("write1.c", OpenFlags::READ),
            Err(SyscallError::TooManyOpenFiles)
        );
    }
}
