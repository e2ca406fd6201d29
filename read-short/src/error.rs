use std::path::PathBuf;
use std::process::ExitCode;

use userlib::SyscallError;

use crate::probe::ProbeState;

/// Failures surfaced by the probe under the strict error policy.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("cannot open '{path}': {source}")]
    Open {
        path: String,
        source: SyscallError,
        state: ProbeState,
    },

    #[error("read on descriptor {fd} failed: {source}")]
    Read {
        fd: i64,
        source: SyscallError,
        state: ProbeState,
    },
}

impl ProbeError {
    /// The runtime error behind this failure.
    pub fn syscall_error(&self) -> SyscallError {
        match self {
            Self::Open { source, .. } | Self::Read { source, .. } => *source,
        }
    }

    /// How far the probe got before stopping.
    pub fn state(&self) -> ProbeState {
        match self {
            Self::Open { state, .. } | Self::Read { state, .. } => *state,
        }
    }
}

/// All errors produced by read-short.
///
/// Variants are split into two categories:
/// - **Infrastructure errors** (exit code 2): bad config, console I/O, encoding
/// - **Operational errors** (exit code 1): the probed file could not be read
#[derive(thiserror::Error, Debug)]
pub enum ReadShortError {
    // ── Infrastructure errors (exit code 2) ──────────────────────────

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Operational errors (exit code 1) ─────────────────────────────

    #[error(transparent)]
    Probe(#[from] ProbeError),
}

impl ReadShortError {
    /// Numeric process exit status.
    ///
    /// - `2` — infrastructure error
    /// - `1` — operational failure
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Config(_)
            | Self::ConfigNotFound { .. }
            | Self::Toml(_)
            | Self::Io(_)
            | Self::Json(_) => 2,

            Self::Probe(_) => 1,
        }
    }

    /// Map each error variant to its process exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}
