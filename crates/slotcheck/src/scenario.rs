//! Scenario configuration.
//!
//! `Scenario::default()` is the fixed meeting-scheduler check. Every field can
//! be overridden from YAML; omitted keys keep their defaults.

use crate::binding::BindingKind;
use crate::result::{SlotCheckError, SlotCheckResult};
use crate::selector::Selector;
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Page under test
pub const DEFAULT_TARGET_URL: &str = "http://localhost:3002/meeting-scheduler-retry/create";

/// Screenshot location, next to this crate's sources
pub const DEFAULT_SCREENSHOT_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/screenshot.png");

/// Calendar day cells of the current month
pub const DATE_CELL_SELECTOR: &str = "[data-v-d3cca5a8].date:not(.other-month)";

/// Generated time-slot buttons
pub const TIME_SLOT_SELECTOR: &str = "button.w-full.py-2.px-4";

/// One input and the value that goes into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Locator strategies in priority order
    pub selectors: Vec<Selector>,
    /// Value to enter
    pub value: String,
}

impl FieldSpec {
    fn new(selectors: &[&str], value: &str) -> Self {
        Self {
            selectors: selectors.iter().map(|s| Selector::parse(s)).collect(),
            value: value.to_string(),
        }
    }
}

/// Bounded-wait budgets for each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitBudget {
    /// Page readiness after navigation
    pub ready: WaitOptions,
    /// Each organizer/meeting-name strategy
    pub field_attempt: WaitOptions,
    /// Calendar day cells
    pub date_cells: WaitOptions,
    /// Each generate-button strategy
    pub button_attempt: WaitOptions,
    /// Slots rendering after the click, before the screenshot
    pub settle: WaitOptions,
    /// Final slot verification
    pub verification: WaitOptions,
}

impl Default for WaitBudget {
    fn default() -> Self {
        Self {
            ready: WaitOptions::millis(10_000),
            field_attempt: WaitOptions::millis(5_000),
            date_cells: WaitOptions::millis(10_000),
            button_attempt: WaitOptions::millis(5_000),
            settle: WaitOptions::millis(2_000),
            verification: WaitOptions::millis(10_000),
        }
    }
}

impl WaitBudget {
    /// Every budget set to the same options
    #[must_use]
    pub const fn uniform(options: WaitOptions) -> Self {
        Self {
            ready: options,
            field_attempt: options,
            date_cells: options,
            button_attempt: options,
            settle: options,
            verification: options,
        }
    }
}

/// Everything the smoke check needs to know about the target page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    /// Page to open
    pub url: String,
    /// Element whose presence means the form has mounted
    pub ready_marker: Selector,
    /// Organizer name input
    pub organizer: FieldSpec,
    /// Meeting name input
    pub meeting_name: FieldSpec,
    /// Selectable calendar day cells
    pub date_cells: Selector,
    /// Time input strategies, accumulated until two are found
    pub time_inputs: Vec<Selector>,
    /// Start of the time range
    pub start_time: String,
    /// End of the time range
    pub end_time: String,
    /// Generate-time-slots control strategies
    pub generate_button: Vec<Selector>,
    /// Generated slot elements
    pub time_slots: Selector,
    /// Screenshot destination, overwritten on each run
    pub screenshot: PathBuf,
    /// How values and clicks reach the page
    pub binding: BindingKind,
    /// Wait budgets
    pub waits: WaitBudget,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            url: DEFAULT_TARGET_URL.to_string(),
            ready_marker: Selector::css("input"),
            organizer: FieldSpec::new(
                &[
                    "input[placeholder='例：山田 太郎']",
                    "//label[contains(text(), '主催者名')]/following-sibling::input",
                ],
                "test organizer",
            ),
            meeting_name: FieldSpec::new(
                &[
                    "input[placeholder='例：2025年度第1回プロジェクト会議']",
                    "//label[contains(text(), '会議名')]/following-sibling::input",
                ],
                "test meeting",
            ),
            date_cells: Selector::css(DATE_CELL_SELECTOR),
            time_inputs: [
                "input[type='time']",
                "//label[contains(text(), '開始時間')]/following-sibling::input[@type='time']",
                "//label[contains(text(), '終了時間')]/following-sibling::input[@type='time']",
                "input[placeholder='開始時間']",
                "input[placeholder='終了時間']",
            ]
            .iter()
            .map(|s| Selector::parse(s))
            .collect(),
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            generate_button: [
                "button:contains('時間枠を生成')",
                "button:contains('Generate Time Slots')",
                "button[data-v-generate-timeslots]",
                "//button[contains(text(), '時間枠を生成')]",
                "//button[contains(text(), 'Generate Time Slots')]",
            ]
            .iter()
            .map(|s| Selector::parse(s))
            .collect(),
            time_slots: Selector::css(TIME_SLOT_SELECTOR),
            screenshot: PathBuf::from(DEFAULT_SCREENSHOT_PATH),
            binding: BindingKind::Reactive,
            waits: WaitBudget::default(),
        }
    }
}

impl Scenario {
    /// Parse and validate a YAML scenario
    pub fn from_yaml_str(yaml: &str) -> SlotCheckResult<Self> {
        let scenario: Self = serde_yaml_ng::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load and validate a YAML scenario file
    pub fn from_file(path: impl AsRef<Path>) -> SlotCheckResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> SlotCheckResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Set the target URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the screenshot destination
    #[must_use]
    pub fn with_screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot = path.into();
        self
    }

    /// Set the field binding
    #[must_use]
    pub const fn with_binding(mut self, binding: BindingKind) -> Self {
        self.binding = binding;
        self
    }

    /// Set the wait budgets
    #[must_use]
    pub const fn with_waits(mut self, waits: WaitBudget) -> Self {
        self.waits = waits;
        self
    }

    /// Reject scenarios that cannot run
    pub fn validate(&self) -> SlotCheckResult<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(SlotCheckError::config(format!(
                "url must be http(s), got {:?}",
                self.url
            )));
        }
        if self.generate_button.is_empty() {
            return Err(SlotCheckError::config(
                "generate_button needs at least one selector",
            ));
        }
        if self.screenshot.as_os_str().is_empty() {
            return Err(SlotCheckError::config("screenshot path is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod default_tests {
        use super::*;

        #[test]
        fn test_default_targets_create_page() {
            let scenario = Scenario::default();
            assert_eq!(
                scenario.url,
                "http://localhost:3002/meeting-scheduler-retry/create"
            );
            assert!(scenario.validate().is_ok());
        }

        #[test]
        fn test_default_values() {
            let scenario = Scenario::default();
            assert_eq!(scenario.organizer.value, "test organizer");
            assert_eq!(scenario.meeting_name.value, "test meeting");
            assert_eq!(scenario.start_time, "09:00");
            assert_eq!(scenario.end_time, "17:00");
        }

        #[test]
        fn test_field_strategies_css_then_path() {
            let scenario = Scenario::default();
            for field in [&scenario.organizer, &scenario.meeting_name] {
                assert_eq!(field.selectors.len(), 2);
                assert!(!field.selectors[0].is_path());
                assert!(field.selectors[1].is_path());
            }
        }

        #[test]
        fn test_generate_button_pseudo_selectors_resolve_to_paths() {
            let scenario = Scenario::default();
            assert_eq!(scenario.generate_button.len(), 5);
            assert!(scenario.generate_button[0].is_path());
            assert!(!scenario.generate_button[2].is_path());
            assert_eq!(
                scenario.generate_button[0].source(),
                scenario.generate_button[3].source()
            );
        }

        #[test]
        fn test_default_wait_budgets() {
            let waits = WaitBudget::default();
            assert_eq!(waits.field_attempt.timeout_ms, 5_000);
            assert_eq!(waits.date_cells.timeout_ms, 10_000);
            assert_eq!(waits.settle.timeout_ms, 2_000);
            assert_eq!(waits.verification.timeout_ms, 10_000);
        }

        #[test]
        fn test_screenshot_next_to_crate() {
            let scenario = Scenario::default();
            assert!(scenario.screenshot.ends_with("screenshot.png"));
            assert!(scenario.screenshot.is_absolute());
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let scenario = Scenario::from_yaml_str(
                "url: http://127.0.0.1:8080/create\nbinding: native\nwaits:\n  verification:\n    timeout_ms: 500\n",
            )
            .unwrap();
            assert_eq!(scenario.url, "http://127.0.0.1:8080/create");
            assert_eq!(scenario.binding, BindingKind::Native);
            assert_eq!(scenario.waits.verification.timeout_ms, 500);
            assert_eq!(scenario.waits.field_attempt.timeout_ms, 5_000);
            assert_eq!(scenario.time_slots, Selector::css(TIME_SLOT_SELECTOR));
        }

        #[test]
        fn test_yaml_roundtrip_of_default() {
            let yaml = Scenario::default().to_yaml().unwrap();
            assert!(yaml.contains("button:contains('時間枠を生成')"));
            assert_eq!(Scenario::from_yaml_str(&yaml).unwrap(), Scenario::default());
        }

        #[test]
        fn test_unknown_key_rejected() {
            let err = Scenario::from_yaml_str("urll: http://x/").unwrap_err();
            assert!(matches!(err, SlotCheckError::Yaml(_)));
        }

        #[test]
        fn test_non_http_url_rejected() {
            let err = Scenario::from_yaml_str("url: file:///tmp/page.html").unwrap_err();
            assert!(matches!(err, SlotCheckError::Config { .. }));
        }

        #[test]
        fn test_empty_generate_list_rejected() {
            let err = Scenario::from_yaml_str("generate_button: []").unwrap_err();
            assert!(err.to_string().contains("generate_button"));
        }

        #[test]
        fn test_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("scenario.yaml");
            std::fs::write(&path, "start_time: \"10:00\"\n").unwrap();
            let scenario = Scenario::from_file(&path).unwrap();
            assert_eq!(scenario.start_time, "10:00");
        }

        #[test]
        fn test_missing_file_is_io_error() {
            let err = Scenario::from_file("/nonexistent/scenario.yaml").unwrap_err();
            assert!(matches!(err, SlotCheckError::Io(_)));
        }
    }
}
