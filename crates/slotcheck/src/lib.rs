//! slotcheck: headless-browser smoke test for the meeting scheduler
//!
//! Opens the meeting creation form, fills it in, asks the page to generate
//! time slots and checks that slot buttons appear.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌─────────────┐    ┌─────────────────┐
//! │ Scenario   │───►│ SmokeRunner │───►│ PageDriver      │
//! │ (YAML)     │    │             │    │  ChromiumDriver │
//! └────────────┘    └──────┬──────┘    │  MockDriver     │
//!                          │           └─────────────────┘
//!              FallbackLocator + FieldBinding
//! ```
//!
//! # Example
//!
//! ```no_run
//! use slotcheck::{MockDriver, Scenario, SmokeRunner};
//!
//! # async fn demo() {
//! let mut driver = MockDriver::new();
//! let report = SmokeRunner::new(Scenario::default()).run(&mut driver).await;
//! assert!(!report.passed);
//! # }
//! ```

#![warn(missing_docs)]

mod binding;
mod browser;
mod driver;
mod locate;
mod report;
mod result;
mod runner;
mod scenario;
mod selector;
mod wait;

pub use binding::{BindingKind, FieldBinding, NativeBinding, ReactiveBinding};
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use browser::{SessionConfig, CHROME_PATH_ENV};
pub use driver::{DomEvent, ElementHandle, MockDriver, MockElement, PageDriver, Screenshot};
pub use locate::{FallbackLocator, Located};
pub use report::{RunReport, Step, StepOutcome, StepStatus, MAX_SLOT_SAMPLES};
pub use result::{SlotCheckError, SlotCheckResult};
#[cfg(feature = "browser")]
pub use runner::{check_time_slots, run_scenario};
pub use runner::SmokeRunner;
pub use scenario::{
    FieldSpec, Scenario, WaitBudget, DATE_CELL_SELECTOR, DEFAULT_SCREENSHOT_PATH,
    DEFAULT_TARGET_URL, TIME_SLOT_SELECTOR,
};
pub use selector::Selector;
pub use wait::{
    wait_for_all, wait_for_interactable, wait_for_present, wait_for_ready_state, wait_until,
    WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
