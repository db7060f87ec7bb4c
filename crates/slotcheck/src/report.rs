//! Run report: what happened during one smoke run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::result::SlotCheckResult;

/// Maximum number of slot texts kept in a report
pub const MAX_SLOT_SAMPLES: usize = 3;

/// Procedure steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Open the target page and wait for it to be ready
    Navigate,
    /// Dump markup and element counts
    Diagnostics,
    /// Fill the organizer name
    Organizer,
    /// Fill the meeting name
    MeetingName,
    /// Click a calendar day
    Date,
    /// Fill the start and end times
    TimeRange,
    /// Activate the generate control
    Generate,
    /// Wait for slots to render
    Settle,
    /// Capture the page
    Screenshot,
    /// Check that slots are displayed
    Verify,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigate => "navigate",
            Self::Diagnostics => "diagnostics",
            Self::Organizer => "organizer",
            Self::MeetingName => "meeting name",
            Self::Date => "date",
            Self::TimeRange => "time range",
            Self::Generate => "generate",
            Self::Settle => "settle",
            Self::Screenshot => "screenshot",
            Self::Verify => "verify",
        };
        f.write_str(name)
    }
}

/// How a step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Completed
    Done,
    /// Target not found; the run moved on
    Skipped,
    /// Faulted
    Failed,
}

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Which step
    pub step: Step,
    /// How it ended
    pub status: StepStatus,
    /// Human-readable detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Summary of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Page that was checked
    pub url: String,
    /// Slots were displayed
    pub passed: bool,
    /// Number of slot elements found
    pub slot_count: usize,
    /// Text of the first few slots
    pub slot_texts: Vec<String>,
    /// Where the screenshot was written, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
    /// Per-step outcomes in execution order
    pub steps: Vec<StepOutcome>,
    /// Why the run did not pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration
    pub duration_ms: u64,
}

impl RunReport {
    /// Empty, not-yet-passed report
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            passed: false,
            slot_count: 0,
            slot_texts: Vec::new(),
            screenshot: None,
            steps: Vec::new(),
            failure: None,
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    /// Report for a run that never got a browser session
    #[must_use]
    pub fn aborted(url: impl Into<String>, failure: impl Into<String>) -> Self {
        let mut report = Self::new(url);
        report.failure = Some(failure.into());
        report
    }

    /// Record a step outcome
    pub fn record(&mut self, step: Step, status: StepStatus, detail: Option<String>) {
        self.steps.push(StepOutcome {
            step,
            status,
            detail,
        });
    }

    /// Record a completed step
    pub fn done(&mut self, step: Step) {
        self.record(step, StepStatus::Done, None);
    }

    /// Record a skipped step
    pub fn skipped(&mut self, step: Step, detail: impl Into<String>) {
        self.record(step, StepStatus::Skipped, Some(detail.into()));
    }

    /// Record a faulted step
    pub fn failed(&mut self, step: Step, detail: impl Into<String>) {
        self.record(step, StepStatus::Failed, Some(detail.into()));
    }

    /// Status of a step, if it ran
    #[must_use]
    pub fn status_of(&self, step: Step) -> Option<StepStatus> {
        self.steps.iter().find(|o| o.step == step).map(|o| o.status)
    }

    /// Store detected slots, keeping at most [`MAX_SLOT_SAMPLES`] texts
    pub fn set_slots(&mut self, count: usize, texts: impl IntoIterator<Item = String>) {
        self.slot_count = count;
        self.slot_texts = texts.into_iter().take(MAX_SLOT_SAMPLES).collect();
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> SlotCheckResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::SlotCheckError;

    #[test]
    fn test_new_report_has_not_passed() {
        let report = RunReport::new("http://localhost:3002/");
        assert!(!report.passed);
        assert!(report.steps.is_empty());
        assert!(report.failure.is_none());
    }

    #[test]
    fn test_slot_texts_capped() {
        let mut report = RunReport::new("http://x/");
        report.set_slots(5, (0..5).map(|i| format!("slot {i}")));
        assert_eq!(report.slot_count, 5);
        assert_eq!(report.slot_texts, vec!["slot 0", "slot 1", "slot 2"]);
    }

    #[test]
    fn test_step_recording() {
        let mut report = RunReport::new("http://x/");
        report.done(Step::Navigate);
        report.skipped(Step::Organizer, "field not found");
        report.failed(Step::Verify, "timeout");

        assert_eq!(report.status_of(Step::Navigate), Some(StepStatus::Done));
        assert_eq!(report.status_of(Step::Organizer), Some(StepStatus::Skipped));
        assert_eq!(report.status_of(Step::Verify), Some(StepStatus::Failed));
        assert_eq!(report.status_of(Step::Date), None);
    }

    #[test]
    fn test_json_shape() {
        let mut report = RunReport::aborted("http://x/", "browser launch failed");
        report.done(Step::MeetingName);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["passed"], false);
        assert_eq!(json["failure"], "browser launch failed");
        assert_eq!(json["steps"][0]["step"], "meeting_name");
        assert_eq!(json["steps"][0]["status"], "done");
        assert!(json.get("screenshot").is_none());
    }

    #[test]
    fn test_json_errors_use_library_result() {
        let report = RunReport::new("http://x/");
        let rendered: SlotCheckResult<String> = report.to_json();
        assert!(rendered.unwrap().contains("\"passed\": false"));

        let err: SlotCheckError = serde_json::from_str::<RunReport>("{").unwrap_err().into();
        assert!(err.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::TimeRange.to_string(), "time range");
        assert_eq!(Step::Verify.to_string(), "verify");
    }
}
