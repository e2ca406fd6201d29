//! Probe configuration.
//!
//! Defaults reproduce the classic smoke test: open `write1.c`, request
//! 102400 bytes. A TOML file may override any field; CLI flags override the
//! file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ReadShortError;
use crate::logger::LogLevel;

/// File the probe opens when none is given.
pub const DEFAULT_PATH: &str = "write1.c";

/// Bytes requested from `read`.
pub const DEFAULT_REQUEST_LEN: usize = 102400;

/// Byte size of the fixed destination under the clamp policy: 1024 slots of
/// four bytes each.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024 * 4;

/// Largest buffer the probe will allocate, in bytes (64 MiB). Bounds both
/// `request_len` and `buffer_capacity`.
pub const MAX_REQUEST_LEN: usize = 64 * 1024 * 1024;

/// How the destination buffer relates to the requested byte count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BufferPolicy {
    /// Allocate exactly as many bytes as are requested.
    #[default]
    SizeToRequest,
    /// Keep a fixed-capacity buffer and shrink the request to fit it.
    Clamp,
}

impl BufferPolicy {
    /// Return `(buffer_len, transfer_len)` for a request against a capacity.
    ///
    /// `transfer_len <= buffer_len` always holds.
    pub fn plan(self, request_len: usize, capacity: usize) -> (usize, usize) {
        match self {
            Self::SizeToRequest => (request_len, request_len),
            Self::Clamp => (capacity, request_len.min(capacity)),
        }
    }
}

impl fmt::Display for BufferPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeToRequest => write!(f, "size-to-request"),
            Self::Clamp => write!(f, "clamp"),
        }
    }
}

/// What happens when `open` or `read` fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Stop at the first failure and surface it; a missing file is reported
    /// before any read is attempted.
    #[default]
    Strict,
    /// Errors are intentionally unchecked: carry the sentinel forward and
    /// print it as the count.
    Permissive,
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Permissive => write!(f, "permissive"),
        }
    }
}

/// Everything the probe needs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// File to open, resolved against `root`.
    pub path: PathBuf,
    /// Directory names are resolved against.
    pub root: PathBuf,
    /// Bytes requested from `read`.
    pub request_len: usize,
    pub buffer_policy: BufferPolicy,
    /// Destination size under `BufferPolicy::Clamp`.
    pub buffer_capacity: usize,
    pub errors: ErrorPolicy,
    pub log_level: LogLevel,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            root: PathBuf::from("."),
            request_len: DEFAULT_REQUEST_LEN,
            buffer_policy: BufferPolicy::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            errors: ErrorPolicy::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl ProbeConfig {
    /// Config for `path` with every other field defaulted.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ReadShortError> {
        if !path.exists() {
            return Err(ReadShortError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let config = Self::parse_str(&contents)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML config string.
    pub fn parse_str(s: &str) -> Result<Self, ReadShortError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the probe cannot honor.
    pub fn validate(&self) -> Result<(), ReadShortError> {
        if self.path.as_os_str().is_empty() {
            return Err(ReadShortError::Config("path must not be empty".to_string()));
        }
        if self.path.to_str().is_none() {
            return Err(ReadShortError::Config(format!(
                "path is not valid UTF-8: {}",
                self.path.display()
            )));
        }
        if self.request_len > MAX_REQUEST_LEN {
            return Err(ReadShortError::Config(format!(
                "request_len {} exceeds the maximum of {} bytes",
                self.request_len, MAX_REQUEST_LEN
            )));
        }
        if self.buffer_capacity > MAX_REQUEST_LEN {
            return Err(ReadShortError::Config(format!(
                "buffer_capacity {} exceeds the maximum of {} bytes",
                self.buffer_capacity, MAX_REQUEST_LEN
            )));
        }
        if self.buffer_policy == BufferPolicy::Clamp && self.buffer_capacity == 0 {
            return Err(ReadShortError::Config(
                "buffer_capacity must be non-zero under the clamp policy".to_string(),
            ));
        }
        Ok(())
    }

    /// The name handed to `open`.
    pub fn file_name(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// `(buffer_len, transfer_len)` for this configuration.
    pub fn plan(&self) -> (usize, usize) {
        self.buffer_policy.plan(self.request_len, self.buffer_capacity)
    }
}
