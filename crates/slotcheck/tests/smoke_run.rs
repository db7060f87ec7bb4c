//! Full procedure runs against the in-memory page.

use slotcheck::{
    BindingKind, MockDriver, MockElement, Scenario, SmokeRunner, Step, StepStatus, WaitBudget,
    WaitOptions, DATE_CELL_SELECTOR, TIME_SLOT_SELECTOR,
};
use std::path::PathBuf;
use tempfile::TempDir;

const ORGANIZER_CSS: &str = "input[placeholder='例：山田 太郎']";
const MEETING_XPATH: &str = "//label[contains(text(), '会議名')]/following-sibling::input";
const GENERATE_XPATH: &str = "//button[contains(text(), '時間枠を生成')]";

fn scenario(dir: &TempDir) -> Scenario {
    Scenario::default()
        .with_url("http://localhost:3002/meeting-scheduler-retry/create")
        .with_waits(WaitBudget::uniform(
            WaitOptions::millis(50).with_poll_interval(5),
        ))
        .with_screenshot(dir.path().join("screenshot.png"))
}

fn form() -> MockDriver {
    MockDriver::new()
        .with_element(
            MockElement::new("organizer", "input")
                .matching("input")
                .matching(ORGANIZER_CSS),
        )
        .with_element(
            MockElement::new("meeting", "input")
                .matching("input")
                .matching(MEETING_XPATH),
        )
        .with_element(
            MockElement::new("day-current", "div")
                .matching(DATE_CELL_SELECTOR)
                .matching("[data-v-d3cca5a8].date"),
        )
        .with_element(MockElement::new("day-other", "div").matching("[data-v-d3cca5a8].date"))
        .with_element(
            MockElement::new("start", "input")
                .matching("input")
                .matching("input[type='time']"),
        )
        .with_element(
            MockElement::new("end", "input")
                .matching("input")
                .matching("input[type='time']"),
        )
}

fn with_generate(driver: MockDriver) -> MockDriver {
    driver.with_element(
        MockElement::new("generate", "button")
            .matching(GENERATE_XPATH)
            .with_text("時間枠を生成"),
    )
}

fn with_slots(mut driver: MockDriver, n: usize) -> MockDriver {
    for i in 0..n {
        driver.add_element(
            MockElement::new(format!("slot-{i}"), "button")
                .matching(TIME_SLOT_SELECTOR)
                .with_text(format!("{:02}:00 - {:02}:00", 9 + i, 10 + i))
                .revealed_by("generate"),
        );
    }
    driver
}

fn screenshot_path(dir: &TempDir) -> PathBuf {
    dir.path().join("screenshot.png")
}

#[tokio::test]
async fn test_complete_form_detects_slots() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_slots(with_generate(form()), 5);

    let report = SmokeRunner::new(scenario(&dir)).run(&mut driver).await;

    assert!(report.passed, "failure: {:?}", report.failure);
    assert_eq!(report.slot_count, 5);
    assert_eq!(
        report.slot_texts,
        vec!["09:00 - 10:00", "10:00 - 11:00", "11:00 - 12:00"]
    );
    assert!(report.failure.is_none());
    assert!(driver.is_closed());

    assert!(screenshot_path(&dir).exists());
    assert_eq!(report.screenshot, Some(screenshot_path(&dir)));
}

#[tokio::test]
async fn test_form_values_reach_the_page() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_slots(with_generate(form()), 1);

    SmokeRunner::new(scenario(&dir)).run(&mut driver).await;

    assert_eq!(driver.value_of("organizer").as_deref(), Some("test organizer"));
    assert_eq!(driver.value_of("meeting").as_deref(), Some("test meeting"));
    assert_eq!(driver.value_of("start").as_deref(), Some("09:00"));
    assert_eq!(driver.value_of("end").as_deref(), Some("17:00"));
    assert!(driver.was_called("dispatch:input:organizer"));
    assert!(driver.was_called("dispatch:input:end"));
}

#[tokio::test]
async fn test_only_current_month_day_clicked_and_button_gets_synthetic_click() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_slots(with_generate(form()), 2);

    SmokeRunner::new(scenario(&dir)).run(&mut driver).await;

    assert_eq!(driver.clicked(), vec!["day-current", "generate"]);
    assert!(driver.was_called("click:day-current"));
    assert!(driver.was_called("dispatch:click:generate"));
    assert!(!driver.was_called("click:generate"));
}

#[tokio::test]
async fn test_steps_recorded_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_slots(with_generate(form()), 1);

    let report = SmokeRunner::new(scenario(&dir)).run(&mut driver).await;

    let steps: Vec<Step> = report.steps.iter().map(|o| o.step).collect();
    assert_eq!(
        steps,
        vec![
            Step::Navigate,
            Step::Diagnostics,
            Step::Organizer,
            Step::MeetingName,
            Step::Date,
            Step::TimeRange,
            Step::Generate,
            Step::Settle,
            Step::Screenshot,
            Step::Verify,
        ]
    );
    assert!(report
        .steps
        .iter()
        .all(|o| o.status == StepStatus::Done));
}

#[tokio::test]
async fn test_missing_generate_button_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_slots(form(), 3);

    let report = SmokeRunner::new(scenario(&dir)).run(&mut driver).await;

    assert!(!report.passed);
    assert_eq!(report.status_of(Step::Generate), Some(StepStatus::Skipped));
    assert_eq!(report.status_of(Step::Verify), Some(StepStatus::Failed));
    assert!(driver.is_closed());
    assert!(screenshot_path(&dir).exists());
}

#[tokio::test]
async fn test_disabled_generate_button_is_not_used() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_slots(
        form().with_element(
            MockElement::new("generate", "button")
                .matching(GENERATE_XPATH)
                .not_interactable(),
        ),
        3,
    );

    let report = SmokeRunner::new(scenario(&dir)).run(&mut driver).await;

    assert!(!report.passed);
    assert!(!driver.clicked().contains(&"generate".to_string()));
}

#[tokio::test]
async fn test_no_slots_after_generate_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_generate(form());

    let report = SmokeRunner::new(scenario(&dir)).run(&mut driver).await;

    assert!(!report.passed);
    assert_eq!(report.slot_count, 0);
    assert!(report.slot_texts.is_empty());
    let failure = report.failure.unwrap();
    assert!(failure.contains("Timed out"), "{failure}");
    assert!(driver.is_closed());
}

#[tokio::test]
async fn test_navigation_failure_fails_and_closes() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_slots(with_generate(form()), 5).failing_navigation();

    let report = SmokeRunner::new(scenario(&dir)).run(&mut driver).await;

    assert!(!report.passed);
    assert!(report.steps.is_empty());
    assert!(report.failure.unwrap().contains("Navigation"));
    assert!(driver.is_closed());
    assert!(!screenshot_path(&dir).exists());
}

#[tokio::test]
async fn test_screenshot_failure_aborts_before_verification() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_slots(with_generate(form()), 5).without_screenshot();

    let report = SmokeRunner::new(scenario(&dir)).run(&mut driver).await;

    assert!(!report.passed);
    assert_eq!(report.status_of(Step::Screenshot), Some(StepStatus::Failed));
    assert_eq!(report.status_of(Step::Verify), None);
    assert!(driver.is_closed());
}

#[tokio::test]
async fn test_missing_fields_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_slots(
        with_generate(MockDriver::new().with_element(MockElement::new("form", "input").matching("input"))),
        2,
    );

    let report = SmokeRunner::new(scenario(&dir)).run(&mut driver).await;

    assert!(report.passed);
    assert_eq!(report.status_of(Step::Organizer), Some(StepStatus::Skipped));
    assert_eq!(report.status_of(Step::MeetingName), Some(StepStatus::Skipped));
    assert_eq!(report.status_of(Step::Date), Some(StepStatus::Skipped));
    assert_eq!(report.status_of(Step::TimeRange), Some(StepStatus::Skipped));
}

#[tokio::test]
async fn test_single_time_input_skips_time_range() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_slots(
        with_generate(
            MockDriver::new().with_element(
                MockElement::new("start", "input")
                    .matching("input")
                    .matching("input[type='time']")
                    .matching("input[placeholder='開始時間']"),
            ),
        ),
        1,
    );

    let report = SmokeRunner::new(scenario(&dir)).run(&mut driver).await;

    assert!(report.passed);
    assert_eq!(report.status_of(Step::TimeRange), Some(StepStatus::Skipped));
    assert_eq!(driver.value_of("start"), None);
}

#[tokio::test]
async fn test_native_binding_types_and_clicks() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_slots(with_generate(form()), 1);

    let report = SmokeRunner::new(scenario(&dir).with_binding(BindingKind::Native))
        .run(&mut driver)
        .await;

    assert!(report.passed);
    assert!(driver.was_called("type:start:09:00"));
    assert!(driver.was_called("click:generate"));
    assert!(!driver.was_called("dispatch"));
}

#[tokio::test]
async fn test_report_serializes() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = with_slots(with_generate(form()), 4);

    let report = SmokeRunner::new(scenario(&dir)).run(&mut driver).await;
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["passed"], true);
    assert_eq!(json["slot_count"], 4);
    assert_eq!(json["slot_texts"].as_array().unwrap().len(), 3);
    assert_eq!(json["steps"].as_array().unwrap().len(), 10);
}
