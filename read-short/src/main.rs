use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use userlib::StdHost;

use read_short::cli::Cli;
use read_short::error::ReadShortError;
use read_short::output::{self, OutputFormat};
use read_short::probe::{self, ProbeReport};
use read_short::logger;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(report) => {
            if let Err(e) = output::emit(cli.output, &report) {
                output::emit_error(cli.output, e.exit_status(), &e.to_string());
                return e.exit_code();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            output::emit_error(cli.output, e.exit_status(), &e.to_string());
            e.exit_code()
        }
    }
}

fn run(cli: &Cli) -> Result<ProbeReport, ReadShortError> {
    let config = cli.resolve_config()?;
    logger::init(config.log_level);
    log::debug!(
        "probing '{}' under {} (request {}, buffer policy {}, errors {})",
        config.path.display(),
        config.root.display(),
        config.request_len,
        config.buffer_policy,
        config.errors
    );

    // JSON mode keeps stdout for the report alone.
    let console: Box<dyn Write> = match cli.output {
        OutputFormat::Json => Box::new(io::stderr()),
        OutputFormat::Human => Box::new(io::stdout()),
    };
    let mut host = StdHost::new(&config.root, console);

    let report = probe::run(&mut host, &config)?;
    log::info!("{}", output::summary(&report));
    Ok(report)
}
