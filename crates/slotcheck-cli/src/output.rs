//! Output formatting and verdict reporting

use console::{style, Term};
use slotcheck::{RunReport, StepStatus};

/// Verdict reporter for smoke runs
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl ProgressReporter {
    /// Create a new reporter writing to stdout
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    fn prefix(&self, glyph: &str, plain: &str, painter: fn(&str) -> String) -> String {
        if self.use_color {
            painter(glyph)
        } else {
            plain.to_string()
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("✓", "PASS", |g| style(g).green().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = self.prefix("✗", "FAIL", |g| style(g).red().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("⚠", "WARN", |g| style(g).yellow().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("ℹ", "INFO", |g| style(g).blue().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print the verdict for a finished run
    pub fn report(&self, report: &RunReport) {
        for outcome in &report.steps {
            if outcome.status == StepStatus::Skipped {
                let detail = outcome.detail.as_deref().unwrap_or("skipped");
                self.warning(&format!("{}: {}", outcome.step, detail));
            }
        }
        if let Some(ref path) = report.screenshot {
            self.info(&format!("screenshot: {}", path.display()));
        }
        if report.passed {
            self.success(&verdict_line(report));
        } else {
            self.failure(&verdict_line(report));
        }
    }
}

/// One-line summary of a run
#[must_use]
pub fn verdict_line(report: &RunReport) -> String {
    if report.passed {
        format!(
            "{} time slot(s) displayed at {} ({} ms)",
            report.slot_count, report.url, report.duration_ms
        )
    } else {
        let reason = report
            .failure
            .as_deref()
            .unwrap_or("time slots are not displayed");
        format!("time slots not displayed at {}: {}", report.url, reason)
    }
}
