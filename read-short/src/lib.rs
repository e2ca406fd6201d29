//! Short-read smoke test.
//!
//! Opens a file, asks `read` for more bytes than the file holds, and prints
//! the count that came back. The routine runs against any
//! [`userlib::Host`], so the same sequence is exercised on the real
//! filesystem by the `read-short` binary and on in-memory fixtures by tests.
//!
//! ```rust,no_run
//! use read_short::{config::ProbeConfig, probe};
//! use userlib::StdHost;
//!
//! let mut host = StdHost::with_stdout(".");
//! let report = probe::run(&mut host, &ProbeConfig::for_path("write1.c")).unwrap();
//! assert!(report.count >= 0);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod output;
pub mod probe;

pub use config::{BufferPolicy, ErrorPolicy, ProbeConfig};
pub use error::{ProbeError, ReadShortError};
pub use probe::{ProbeReport, ProbeState};
