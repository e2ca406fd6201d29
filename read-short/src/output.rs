use serde::Serialize;
use std::fmt;
use std::io::Write;

use crate::error::ReadShortError;
use crate::probe::ProbeReport;

/// Output format selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single JSON report object on stdout; program output moves to stderr.
    Json,
    /// Program output on stdout, nothing else.
    #[default]
    Human,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Human => write!(f, "human"),
        }
    }
}

/// Write a successful result.
///
/// - **Json**: a single JSON object on stdout, no extraneous text.
/// - **Human**: the program already printed its result line; the report is
///   only logged.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T) -> Result<(), ReadShortError> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string(value)?;
            writeln!(std::io::stdout().lock(), "{json}")?;
        }
        OutputFormat::Human => {
            let pretty = serde_json::to_string_pretty(value)?;
            log::debug!("report: {pretty}");
        }
    }
    Ok(())
}

/// One-line summary of a report.
pub fn summary(report: &ProbeReport) -> String {
    match report.transferred() {
        Some(n) if report.short_read => format!(
            "{}: short read, {} of {} bytes",
            report.path, n, report.transfer_len
        ),
        Some(n) => format!("{}: read {} bytes", report.path, n),
        None => format!(
            "{}: read failed ({}), count {}",
            report.path,
            report.error.as_deref().unwrap_or("unknown error"),
            report.count
        ),
    }
}

/// Build the JSON object emitted for an error.
pub fn error_object(exit_code_num: u8, message: &str) -> serde_json::Value {
    serde_json::json!({
        "error": message,
        "exit_code": exit_code_num,
    })
}

/// Compact JSON text of `error_object`.
pub fn error_line(exit_code_num: u8, message: &str) -> String {
    error_object(exit_code_num, message).to_string()
}

/// Write an error to stdout (JSON mode) or stderr (human mode).
///
/// `exit_code_num` is the raw numeric exit code (1 or 2).
pub fn emit_error(format: OutputFormat, exit_code_num: u8, message: &str) {
    match format {
        OutputFormat::Json => {
            // JSON errors go to stdout so the caller always gets valid JSON on stdout.
            println!("{}", error_line(exit_code_num, message));
        }
        OutputFormat::Human => {
            eprintln!("error: {message}");
        }
    }
}
