//! Config command handler

use crate::error::CliResult;
use crate::ConfigArgs;
use slotcheck::Scenario;
use std::path::Path;

/// Defaults, merged with the scenario file when one is given
pub fn load_scenario(path: Option<&Path>) -> CliResult<Scenario> {
    match path {
        Some(path) => Ok(Scenario::from_file(path)?),
        None => Ok(Scenario::default()),
    }
}

/// Render the effective scenario
pub fn render_config(args: &ConfigArgs) -> CliResult<String> {
    let scenario = load_scenario(args.config.as_deref())?;
    Ok(scenario.to_yaml()?)
}

/// Execute the config command
pub fn execute_config(args: &ConfigArgs) -> CliResult<()> {
    print!("{}", render_config(args)?);
    Ok(())
}
