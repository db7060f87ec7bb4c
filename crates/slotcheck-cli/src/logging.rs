//! Log subscriber setup

use crate::config::{CliConfig, Verbosity};
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, falling back to the verbosity level
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)))
}

/// Library progress at the chosen level; CDP internals stay at warn below debug
#[must_use]
pub fn default_directives(config: &CliConfig) -> String {
    let level = config.verbosity.filter_directive();
    match config.verbosity {
        Verbosity::Debug => level.to_string(),
        Verbosity::Verbose => format!("{level},chromiumoxide=warn"),
        Verbosity::Quiet | Verbosity::Normal => {
            format!("warn,slotcheck={level},slotcheck_cli={level}")
        }
    }
}

/// Install the global fmt subscriber writing to stdout
pub fn init(config: &CliConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(config.verbosity.is_verbose())
        .with_ansi(config.use_color())
        .with_writer(std::io::stdout)
        .try_init();
}
