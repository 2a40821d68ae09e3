//! Diagnos CLI - Command-line interface for the Diagnos cognitive diagnosis engine.

use clap::Parser;
use diagnos_cli::commands;
use diagnos_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "diagnos=debug" } else { "diagnos=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> diagnos_cli::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    // Simulate needs no configured cohorts; everything else opens them
    let service = || config.open_service();

    match cli.command {
        Command::Simulate(args) => {
            commands::execute_simulate(args, &formatter)?;
        }
        Command::Diagnose(args) => {
            commands::execute_diagnose(args, &config, &service()?, &formatter)?;
        }
        Command::Calibrate(args) => {
            commands::execute_calibrate(args, &config, &service()?, &formatter)?;
        }
        Command::Estimate(args) => {
            commands::execute_estimate(args, &config, &service()?, &formatter)?;
        }
        Command::Remedial(args) => {
            commands::execute_remedial(args, &config, &service()?, &formatter)?;
        }
        Command::Log(args) => {
            commands::execute_log(args, &config, &service()?, &formatter)?;
        }
        Command::Cohorts => {
            commands::execute_cohorts(&config, &service()?, &formatter)?;
        }
    }

    Ok(())
}
