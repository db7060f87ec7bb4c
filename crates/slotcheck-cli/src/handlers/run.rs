//! Run command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::handlers::config::load_scenario;
use crate::output::ProgressReporter;
use crate::RunArgs;
use slotcheck::{RunReport, Scenario, SessionConfig};
#[cfg(feature = "browser")]
use tracing::info;

/// Apply command-line overrides and validate
pub fn apply_overrides(mut scenario: Scenario, args: &RunArgs) -> CliResult<Scenario> {
    if let Some(ref url) = args.url {
        scenario = scenario.with_url(url.clone());
    }
    if let Some(ref path) = args.screenshot {
        scenario = scenario.with_screenshot(path.clone());
    }
    scenario.validate()?;
    Ok(scenario)
}

/// Browser launch settings; `CHROME_PATH` applies when `--chrome` is absent
#[must_use]
pub fn session_config(args: &RunArgs) -> SessionConfig {
    let session = SessionConfig::from_env().with_headless(!args.headed);
    match args.chrome {
        Some(ref path) => session.with_chrome_path(path.clone()),
        None => session,
    }
}

/// Execute the run command
#[cfg(feature = "browser")]
pub async fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let scenario = apply_overrides(load_scenario(args.config.as_deref())?, args)?;
    let session = session_config(args);
    info!("checking time slots at {}", scenario.url);

    let report = slotcheck::run_scenario(scenario, &session).await;
    finish(config, args, &report)
}

/// Execute the run command
#[cfg(not(feature = "browser"))]
pub async fn execute_run(_config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    apply_overrides(load_scenario(args.config.as_deref())?, args)?;
    Err(CliError::config(
        "browser support not enabled. Rebuild with --features browser",
    ))
}

/// Print the verdict and map the result to an exit status
pub fn finish(config: &CliConfig, args: &RunArgs, report: &RunReport) -> CliResult<()> {
    let reporter = ProgressReporter::new(config.use_color(), config.verbosity.is_quiet());
    reporter.report(report);

    if args.json {
        println!("{}", report.to_json()?);
    }

    if args.strict && !report.passed {
        return Err(CliError::check_failed(
            report
                .failure
                .clone()
                .unwrap_or_else(|| "time slots are not displayed".to_string()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    mod override_tests {
        use super::*;

        #[test]
        fn test_url_and_screenshot_override() {
            let args = RunArgs {
                url: Some("http://127.0.0.1:8080/create".to_string()),
                screenshot: Some(PathBuf::from("/tmp/shot.png")),
                ..RunArgs::default()
            };
            let scenario = apply_overrides(Scenario::default(), &args).unwrap();
            assert_eq!(scenario.url, "http://127.0.0.1:8080/create");
            assert_eq!(scenario.screenshot, PathBuf::from("/tmp/shot.png"));
        }

        #[test]
        fn test_invalid_url_rejected() {
            let args = RunArgs {
                url: Some("localhost:3002".to_string()),
                ..RunArgs::default()
            };
            assert!(apply_overrides(Scenario::default(), &args).is_err());
        }
    }

    mod session_tests {
        use super::*;

        #[test]
        fn test_headless_by_default() {
            let session = session_config(&RunArgs::default());
            assert!(session.headless);
            assert_eq!(session.window_width, 1920);
        }

        #[test]
        fn test_headed_and_chrome() {
            let args = RunArgs {
                headed: true,
                chrome: Some(PathBuf::from("/opt/chromium/chrome")),
                ..RunArgs::default()
            };
            let session = session_config(&args);
            assert!(!session.headless);
            assert_eq!(session.chrome_path, Some(PathBuf::from("/opt/chromium/chrome")));
        }
    }

    mod finish_tests {
        use super::*;

        fn quiet() -> CliConfig {
            CliConfig::new()
                .with_verbosity(crate::Verbosity::Quiet)
                .with_color(crate::ColorChoice::Never)
        }

        #[test]
        fn test_failed_run_exits_cleanly_without_strict() {
            let report = RunReport::new("http://x/");
            assert!(finish(&quiet(), &RunArgs::default(), &report).is_ok());
        }

        #[test]
        fn test_strict_failed_run_is_error() {
            let args = RunArgs {
                strict: true,
                ..RunArgs::default()
            };
            let report = RunReport::aborted("http://x/", "navigation failed");
            let err = finish(&quiet(), &args, &report).unwrap_err();
            assert!(err.to_string().contains("navigation failed"));
        }

        #[test]
        fn test_strict_passed_run_is_ok() {
            let args = RunArgs {
                strict: true,
                ..RunArgs::default()
            };
            let mut report = RunReport::new("http://x/");
            report.passed = true;
            assert!(finish(&quiet(), &args, &report).is_ok());
        }
    }
}
