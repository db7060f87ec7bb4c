//! The smoke-test procedure.
//!
//! [`SmokeRunner::run`] drives one pass over the scheduling form: open the
//! page, fill the organizer and meeting name, pick a day, set the time range,
//! generate slots, screenshot, then verify slots are displayed. Missing form
//! elements are logged and skipped; navigation, diagnostics and screenshot
//! faults end the run. The driver is closed before `run` returns, whatever
//! happened.

use crate::binding::FieldBinding;
use crate::driver::{ElementHandle, PageDriver};
use crate::locate::FallbackLocator;
use crate::report::{RunReport, Step, MAX_SLOT_SAMPLES};
use crate::result::SlotCheckResult;
use crate::scenario::{FieldSpec, Scenario};
use crate::wait::{wait_for_all, wait_for_present, wait_for_ready_state, WaitOptions};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Counts every element in the document
const ELEMENT_COUNT_SCRIPT: &str = "document.getElementsByTagName('*').length";

/// Counts elements carrying front-end framework markers
const FRAMEWORK_MARKER_SCRIPT: &str = "Array.from(document.getElementsByTagName('*')).filter(el =>
    Array.from(el.attributes).some(a => a.name.startsWith('data-v-'))
    || (el.getAttribute('class') || '').includes('v-')
).length";

/// Runs the smoke procedure for one [`Scenario`]
#[derive(Debug)]
pub struct SmokeRunner {
    scenario: Scenario,
    binding: Box<dyn FieldBinding>,
}

impl SmokeRunner {
    /// Create a runner using the scenario's binding
    #[must_use]
    pub fn new(scenario: Scenario) -> Self {
        let binding = scenario.binding.build();
        Self { scenario, binding }
    }

    /// Replace the field binding
    #[must_use]
    pub fn with_binding(mut self, binding: Box<dyn FieldBinding>) -> Self {
        self.binding = binding;
        self
    }

    /// The scenario being run
    #[must_use]
    pub const fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Run the procedure and close the driver
    pub async fn run(&self, driver: &mut dyn PageDriver) -> RunReport {
        let clock = Instant::now();
        let mut report = RunReport::new(&self.scenario.url);

        if let Err(e) = self.drive(driver, &mut report).await {
            if e.is_timeout() {
                error!("timeout: {}", e);
            } else {
                error!("error: {}", e);
            }
            report.passed = false;
            report.failure = Some(e.to_string());
        }

        if let Err(e) = driver.close().await {
            warn!("failed to close browser session: {}", e);
        }

        report.duration_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        report
    }

    async fn drive(
        &self,
        driver: &mut dyn PageDriver,
        report: &mut RunReport,
    ) -> SlotCheckResult<()> {
        let scenario = &self.scenario;

        driver.navigate(&scenario.url).await?;
        info!("opened {}", scenario.url);
        let page: &dyn PageDriver = &*driver;
        self.await_ready(page).await;
        report.done(Step::Navigate);

        self.diagnostics(page).await?;
        report.done(Step::Diagnostics);

        self.fill_field(page, Step::Organizer, "organizer name", &scenario.organizer, report)
            .await;
        self.fill_field(page, Step::MeetingName, "meeting name", &scenario.meeting_name, report)
            .await;
        self.select_date(page, report).await;
        self.fill_time_range(page, report).await;
        self.generate(page, report).await;

        self.settle(page, report).await?;
        self.capture(page, report).await?;
        self.verify(page, report).await
    }

    async fn await_ready(&self, page: &dyn PageDriver) {
        let waits = &self.scenario.waits;
        let ready = match wait_for_ready_state(page, &waits.ready).await {
            Ok(()) => wait_for_present(page, &self.scenario.ready_marker, &waits.ready)
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };
        match ready {
            Ok(()) => debug!("page ready"),
            Err(e) => warn!("page not ready, continuing: {}", e),
        }
    }

    async fn diagnostics(&self, page: &dyn PageDriver) -> SlotCheckResult<()> {
        let markup = page.page_source().await?;
        info!("document markup:\n{}", markup);

        let total = page.evaluate(ELEMENT_COUNT_SCRIPT).await?.as_u64().unwrap_or(0);
        info!("detected elements: {}", total);

        let marked = page
            .evaluate(FRAMEWORK_MARKER_SCRIPT)
            .await?
            .as_u64()
            .unwrap_or(0);
        info!("framework-marked elements: {}", marked);
        Ok(())
    }

    async fn fill_field(
        &self,
        page: &dyn PageDriver,
        step: Step,
        label: &str,
        field: &FieldSpec,
        report: &mut RunReport,
    ) {
        let locator = FallbackLocator::new(
            label,
            field.selectors.iter().cloned(),
            self.scenario.waits.field_attempt,
        );
        let Some(found) = locator.first_present(page).await else {
            warn!("{} field not found", label);
            report.skipped(step, "field not found");
            return;
        };

        match self.binding.fill(page, &found.element, &field.value).await {
            Ok(()) => {
                info!("{} entered", label);
                report.done(step);
            }
            Err(e) => {
                warn!("{} input error: {}", label, e);
                report.failed(step, e.to_string());
            }
        }
    }

    async fn select_date(&self, page: &dyn PageDriver, report: &mut RunReport) {
        let scenario = &self.scenario;
        let result = async {
            let cells = wait_for_all(page, &scenario.date_cells, &scenario.waits.date_cells).await?;
            info!("detected dates: {}", cells.len());
            if let Some(first) = cells.first() {
                page.click(first).await?;
            }
            Ok::<_, crate::SlotCheckError>(())
        }
        .await;

        match result {
            Ok(()) => {
                info!("date selected");
                report.done(Step::Date);
            }
            Err(e) if e.is_timeout() => {
                warn!("date selection error: {}", e);
                report.skipped(Step::Date, e.to_string());
            }
            Err(e) => {
                warn!("date selection error: {}", e);
                report.failed(Step::Date, e.to_string());
            }
        }
    }

    async fn fill_time_range(&self, page: &dyn PageDriver, report: &mut RunReport) {
        let scenario = &self.scenario;
        // queried once per strategy, no per-strategy wait
        let locator = FallbackLocator::new(
            "time input",
            scenario.time_inputs.iter().cloned(),
            WaitOptions::millis(0),
        );
        let inputs = locator.collect_at_least(page, 2).await;
        info!("detected time inputs: {}", inputs.len());

        let [start, end, ..] = inputs.as_slice() else {
            warn!("time input fields not found");
            report.skipped(Step::TimeRange, format!("{} time input(s) found", inputs.len()));
            return;
        };

        match self.set_times(page, &inputs, start, end).await {
            Ok(()) => {
                info!("time range entered");
                report.done(Step::TimeRange);
            }
            Err(e) => {
                warn!("time range input error: {}", e);
                report.failed(Step::TimeRange, e.to_string());
            }
        }
    }

    async fn set_times(
        &self,
        page: &dyn PageDriver,
        inputs: &[ElementHandle],
        start: &ElementHandle,
        end: &ElementHandle,
    ) -> SlotCheckResult<()> {
        for input in inputs {
            page.clear(input).await?;
        }
        self.binding.fill(page, start, &self.scenario.start_time).await?;
        self.binding.fill(page, end, &self.scenario.end_time).await
    }

    async fn generate(&self, page: &dyn PageDriver, report: &mut RunReport) {
        let locator = FallbackLocator::new(
            "generate button",
            self.scenario.generate_button.iter().cloned(),
            self.scenario.waits.button_attempt,
        );
        let Some(found) = locator.first_interactable(page).await else {
            warn!("generate button not found");
            report.skipped(Step::Generate, "button not found");
            return;
        };

        match self.binding.activate(page, &found.element).await {
            Ok(()) => {
                info!("generate button clicked ({})", found.selector);
                report.done(Step::Generate);
            }
            Err(e) => {
                warn!("generate button click error: {}", e);
                report.failed(Step::Generate, e.to_string());
            }
        }
    }

    async fn settle(&self, page: &dyn PageDriver, report: &mut RunReport) -> SlotCheckResult<()> {
        match wait_for_present(page, &self.scenario.time_slots, &self.scenario.waits.settle).await {
            Ok(_) => {
                report.done(Step::Settle);
                Ok(())
            }
            Err(e) if e.is_timeout() => {
                debug!("slots not rendered within settle window");
                report.skipped(Step::Settle, e.to_string());
                Ok(())
            }
            Err(e) => {
                report.failed(Step::Settle, e.to_string());
                Err(e)
            }
        }
    }

    async fn capture(&self, page: &dyn PageDriver, report: &mut RunReport) -> SlotCheckResult<()> {
        let path = &self.scenario.screenshot;
        let written = async {
            let shot = page.screenshot().await?;
            tokio::fs::write(path, &shot.data).await?;
            Ok::<_, crate::SlotCheckError>(shot.size_bytes())
        }
        .await;

        match written {
            Ok(bytes) => {
                info!("screenshot saved: {}", path.display());
                debug!("screenshot size: {} bytes", bytes);
                report.screenshot = Some(path.clone());
                report.done(Step::Screenshot);
                Ok(())
            }
            Err(e) => {
                report.failed(Step::Screenshot, e.to_string());
                Err(e)
            }
        }
    }

    async fn verify(&self, page: &dyn PageDriver, report: &mut RunReport) -> SlotCheckResult<()> {
        let scenario = &self.scenario;
        let slots = match wait_for_all(page, &scenario.time_slots, &scenario.waits.verification).await
        {
            Ok(slots) => slots,
            Err(e) => {
                if e.is_timeout() {
                    info!("time slots are not displayed");
                }
                report.failed(Step::Verify, e.to_string());
                return Err(e);
            }
        };

        info!("detected slots: {}", slots.len());
        info!("time slots are displayed");
        let mut texts = Vec::with_capacity(MAX_SLOT_SAMPLES);
        for slot in slots.iter().take(MAX_SLOT_SAMPLES) {
            let text = page.text(slot).await?;
            info!("slot: {}", text);
            texts.push(text);
        }

        report.set_slots(slots.len(), texts);
        report.passed = true;
        report.done(Step::Verify);
        Ok(())
    }
}

/// Launch Chromium and run `scenario` against it
#[cfg(feature = "browser")]
pub async fn run_scenario(
    scenario: Scenario,
    session: &crate::browser::SessionConfig,
) -> RunReport {
    let url = scenario.url.clone();
    let mut driver = match crate::browser::ChromiumDriver::launch(session).await {
        Ok(driver) => driver,
        Err(e) => {
            error!("error: {}", e);
            return RunReport::aborted(url, e.to_string());
        }
    };
    SmokeRunner::new(scenario).run(&mut driver).await
}

/// Run the default meeting-scheduler check; true when slots are displayed
///
/// Progress goes to the installed `tracing` subscriber. When none is
/// installed, the run logs through a stdout fmt subscriber of its own.
#[cfg(feature = "browser")]
pub async fn check_time_slots() -> bool {
    use tracing::instrument::WithSubscriber;

    let session = crate::browser::SessionConfig::from_env();
    let run = run_scenario(Scenario::default(), &session);
    match stdout_fallback() {
        Some(dispatch) => run.with_subscriber(dispatch).await.passed,
        None => run.await.passed,
    }
}

/// A stdout fmt dispatcher, only when no subscriber is active
#[cfg(feature = "browser")]
fn stdout_fallback() -> Option<tracing::Dispatch> {
    let unset = tracing::dispatcher::get_default(|current| {
        current.is::<tracing::subscriber::NoSubscriber>()
    });
    unset.then(|| {
        tracing::Dispatch::new(
            tracing_subscriber::fmt()
                .with_writer(std::io::stdout)
                .finish(),
        )
    })
}
