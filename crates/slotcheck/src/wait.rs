//! Bounded waits.
//!
//! Every wait polls a readiness check until it yields a value or the deadline
//! elapses, at which point it fails with [`SlotCheckError::Timeout`]. The check
//! always runs at least once, so a zero timeout is a single immediate check.

use crate::driver::{ElementHandle, PageDriver};
use crate::result::{SlotCheckError, SlotCheckResult};
use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

const fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default options with a different timeout
    #[must_use]
    pub const fn millis(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Poll `check` until it yields `Some`, the deadline elapses, or it fails
pub async fn wait_until<T, F, Fut>(
    waited_for: &str,
    options: &WaitOptions,
    mut check: F,
) -> SlotCheckResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SlotCheckResult<Option<T>>>,
{
    let start = Instant::now();
    let timeout = options.timeout();

    loop {
        if let Some(value) = check().await? {
            debug!("{} satisfied after {:?}", waited_for, start.elapsed());
            return Ok(value);
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(SlotCheckError::timeout(waited_for, options.timeout_ms));
        }
        let remaining = timeout - elapsed;
        tokio::time::sleep(options.poll_interval().min(remaining)).await;
    }
}

/// Wait for at least one element matching `selector`; returns the first
pub async fn wait_for_present<D: PageDriver + ?Sized>(
    driver: &D,
    selector: &Selector,
    options: &WaitOptions,
) -> SlotCheckResult<ElementHandle> {
    let waited_for = format!("presence of {selector}");
    wait_until(&waited_for, options, move || async move {
        Ok(driver.query_all(selector).await?.into_iter().next())
    })
    .await
}

/// Wait until `selector` matches at least one element; returns all matches
pub async fn wait_for_all<D: PageDriver + ?Sized>(
    driver: &D,
    selector: &Selector,
    options: &WaitOptions,
) -> SlotCheckResult<Vec<ElementHandle>> {
    let waited_for = format!("presence of all {selector}");
    wait_until(&waited_for, options, move || async move {
        let found = driver.query_all(selector).await?;
        Ok((!found.is_empty()).then_some(found))
    })
    .await
}

/// Wait for an element matching `selector` that is displayed and enabled
pub async fn wait_for_interactable<D: PageDriver + ?Sized>(
    driver: &D,
    selector: &Selector,
    options: &WaitOptions,
) -> SlotCheckResult<ElementHandle> {
    let waited_for = format!("{selector} to be clickable");
    wait_until(&waited_for, options, move || async move {
        for element in driver.query_all(selector).await? {
            if driver.is_interactable(&element).await? {
                return Ok(Some(element));
            }
        }
        Ok(None)
    })
    .await
}

/// Wait for `document.readyState` to reach `complete`
pub async fn wait_for_ready_state<D: PageDriver + ?Sized>(
    driver: &D,
    options: &WaitOptions,
) -> SlotCheckResult<()> {
    wait_until("document ready state", options, move || async move {
        Ok((driver.ready_state().await? == "complete").then_some(()))
    })
    .await
}
