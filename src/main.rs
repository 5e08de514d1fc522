use clap::Parser;
use dbpeek::cli::Cli;
use dbpeek::config::{self, InspectConfig};
use dbpeek::core::Result;
use dbpeek::inspector::{Inspector, RunStatus};
use std::process::ExitCode;
use tracing::{info, Level};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so the report on stdout stays byte-stable
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting dbpeek...");

    match run(&cli) {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunStatus> {
    let file_config = config::load_for_cli(cli)?;
    let config = InspectConfig::resolve(cli, file_config)?;
    info!("Inspecting {} (table {})", config.path.display(), config.table);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    Inspector::new(config).run(&mut out)
}
