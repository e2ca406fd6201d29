//! The short-read probe.
//!
//! Prints a banner, opens the configured file, reads with a request that
//! may exceed the file's size, prints `Read <n>`, and closes the
//! descriptor. Under the strict policy the first failure stops the run;
//! under the permissive policy failures are carried forward as negative
//! sentinels and printed as the count.

use chrono::{DateTime, Utc};
use serde::Serialize;
use userlib::host::Host;
use userlib::io;
use userlib::syscall::{descriptor_from_raw, to_raw, SyscallResult};

use crate::config::{ErrorPolicy, ProbeConfig};
use crate::error::ProbeError;

/// Diagnostic line printed before anything else.
pub const BANNER: &str = "Here we are";

/// Progress through the probe. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeState {
    NotStarted,
    Opened,
    ReadAttempted,
    Done,
}

/// Outcome of a completed probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub path: String,
    /// Bytes asked for by configuration.
    pub requested: usize,
    /// Bytes actually handed to `read` after the buffer policy.
    pub transfer_len: usize,
    pub buffer_len: usize,
    pub descriptor: Option<u64>,
    /// Raw count as printed: bytes read, or a negative sentinel.
    pub count: i64,
    pub short_read: bool,
    pub error: Option<String>,
    pub state: ProbeState,
    pub started_at: DateTime<Utc>,
}

impl ProbeReport {
    /// Bytes transferred, if the read succeeded.
    pub fn transferred(&self) -> Option<usize> {
        usize::try_from(self.count).ok()
    }

    /// The line the probe printed for this report.
    pub fn result_line(&self) -> String {
        format!("Read {}", self.count)
    }
}

fn advance(state: &mut ProbeState, next: ProbeState) {
    log::trace!("probe state {:?} -> {:?}", state, next);
    *state = next;
}

fn short_read(read: &SyscallResult, transfer_len: usize) -> bool {
    matches!(read, Ok(n) if (*n as usize) < transfer_len)
}

/// Run the probe against `host`.
pub fn run<H: Host + ?Sized>(
    host: &mut H,
    config: &ProbeConfig,
) -> Result<ProbeReport, ProbeError> {
    let started_at = Utc::now();
    let name = config.file_name();
    let strict = config.errors == ErrorPolicy::Strict;
    let mut state = ProbeState::NotStarted;
    let mut first_error = None;

    io::println(host, BANNER);

    let (buffer_len, transfer_len) = config.plan();
    if transfer_len < config.request_len {
        log::warn!(
            "request of {} bytes clamped to buffer capacity {}",
            config.request_len,
            transfer_len
        );
    }

    let opened = io::open(host, &name);
    let raw_fd = to_raw(opened);
    let descriptor = match opened {
        Ok(fd) => {
            advance(&mut state, ProbeState::Opened);
            log::debug!("opened '{}' as fd {}", name, fd);
            Some(fd)
        }
        Err(source) => {
            log::warn!("open '{}' failed: {}", name, source);
            if strict {
                return Err(ProbeError::Open {
                    path: name,
                    source,
                    state,
                });
            }
            first_error = Some(source.to_string());
            None
        }
    };

    let mut buffer = vec![0u8; buffer_len];
    let read = descriptor_from_raw(raw_fd)
        .and_then(|fd| io::read(host, fd, &mut buffer[..transfer_len]));
    advance(&mut state, ProbeState::ReadAttempted);

    if let Err(source) = read {
        log::warn!("read on fd {} failed: {}", raw_fd, source);
        if strict {
            if let Some(fd) = descriptor {
                if let Err(e) = io::close(host, fd) {
                    log::warn!("close fd {} failed: {}", fd, e);
                }
            }
            return Err(ProbeError::Read {
                fd: raw_fd,
                source,
                state,
            });
        }
        if first_error.is_none() {
            first_error = Some(source.to_string());
        }
    }

    let count = to_raw(read);
    io::println(host, &format!("Read {}", count));

    if let Some(fd) = descriptor {
        if let Err(e) = io::close(host, fd) {
            log::warn!("close fd {} failed: {}", fd, e);
        }
    }
    advance(&mut state, ProbeState::Done);

    let report = ProbeReport {
        path: name,
        requested: config.request_len,
        transfer_len,
        buffer_len,
        descriptor,
        count,
        short_read: short_read(&read, transfer_len),
        error: first_error,
        state,
        started_at,
    };
    log::info!(
        "{}: requested {} bytes, got {}{}",
        report.path,
        report.transfer_len,
        report.count,
        if report.short_read { " (short read)" } else { "" }
    );
    Ok(report)
}
