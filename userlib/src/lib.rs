//! Userspace runtime surface.
//!
//! This library provides the system calls a user program consumes
//! (`open`, `read`, `write`, `close`) and the console print helpers,
//! behind a `Host` trait so programs can run against the real filesystem
//! or an in-memory namespace.
//!
//! # Example
//!
//! ```rust,no_run
//! use userlib::prelude::*;
//!
//! let mut host = StdHost::with_stdout(".");
//! println(&mut host, "Hello from userspace!");
//! ```

pub mod fd;
pub mod host;
pub mod host_fs;
pub mod io;
pub mod mem;
pub mod syscall;

pub use host::{Host, OpenFlags};
pub use host_fs::StdHost;
pub use mem::MemHost;
pub use syscall::{SyscallError, SyscallResult};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::host::{Host, OpenFlags};
    pub use crate::host_fs::StdHost;
    pub use crate::io::{close, creat, open, print, println, read, write};
    pub use crate::mem::MemHost;
    pub use crate::syscall::{SyscallError, SyscallResult};
}
