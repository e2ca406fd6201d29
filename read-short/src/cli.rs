use std::path::PathBuf;

use clap::Parser;

use crate::config::{BufferPolicy, ErrorPolicy, ProbeConfig};
use crate::error::ReadShortError;
use crate::logger::LogLevel;
use crate::output::OutputFormat;

/// Open a file, request more bytes than it holds, and print how many came back.
#[derive(Parser, Debug)]
#[command(name = "read-short", version, about)]
pub struct Cli {
    /// File to open, relative to --root (default: write1.c).
    pub path: Option<PathBuf>,

    /// Directory file names are resolved against.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Number of bytes to request from read.
    #[arg(long)]
    pub request_len: Option<usize>,

    /// Size the buffer to the request, or clamp the request to the buffer.
    #[arg(long, value_enum)]
    pub buffer_policy: Option<BufferPolicy>,

    /// Buffer capacity in bytes under the clamp policy.
    #[arg(long)]
    pub buffer_capacity: Option<usize>,

    /// Fail on open/read errors, or print the sentinel and carry on.
    #[arg(long, value_enum)]
    pub errors: Option<ErrorPolicy>,

    /// TOML configuration file. Flags given here override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Log verbosity on stderr.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

impl Cli {
    /// Merge the config file (if any) with command-line overrides.
    pub fn resolve_config(&self) -> Result<ProbeConfig, ReadShortError> {
        let mut config = match &self.config {
            Some(path) => ProbeConfig::load(path)?,
            None => ProbeConfig::default(),
        };

        if let Some(path) = &self.path {
            config.path = path.clone();
        }
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(n) = self.request_len {
            config.request_len = n;
        }
        if let Some(policy) = self.buffer_policy {
            config.buffer_policy = policy;
        }
        if let Some(n) = self.buffer_capacity {
            config.buffer_capacity = n;
        }
        if let Some(policy) = self.errors {
            config.errors = policy;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }
}
