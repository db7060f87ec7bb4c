//! slotcheck CLI: smoke test for the meeting scheduler
//!
//! ## Usage
//!
//! ```bash
//! slotcheck                                  # Run with defaults
//! slotcheck run --url http://host:3002/...   # Different target
//! slotcheck run --config scenario.yaml --json --strict
//! slotcheck config                           # Print the effective scenario
//! ```

use clap::Parser;
use slotcheck_cli::{handlers, logging, Cli, CliConfig, CliResult, Commands, RunArgs, Verbosity};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    match cli.command {
        Some(Commands::Run(args)) => {
            logging::init(&config);
            handlers::execute_run(&config, &args).await
        }
        Some(Commands::Config(args)) => handlers::execute_config(&args),
        None => {
            logging::init(&config);
            handlers::execute_run(&config, &RunArgs::default()).await
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(cli.color.clone().into())
}
