//! Ordered fallback over locator strategies.
//!
//! A [`FallbackLocator`] holds a prioritized list of selectors for one logical
//! element. Candidates are tried in order, each with its own bounded wait, and
//! the first one that resolves wins. Exhausting the list is not an error.

use crate::driver::{ElementHandle, PageDriver};
use crate::selector::Selector;
use crate::wait::{wait_for_interactable, wait_for_present, WaitOptions};
use tracing::{debug, warn};

/// What a candidate must satisfy to win
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Present,
    Interactable,
}

/// A resolved candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// The matched element
    pub element: ElementHandle,
    /// The strategy that matched
    pub selector: Selector,
    /// Zero-based position of that strategy in the list
    pub attempt: usize,
}

/// Prioritized selector list for one logical element
#[derive(Debug, Clone)]
pub struct FallbackLocator {
    name: String,
    candidates: Vec<Selector>,
    per_attempt: WaitOptions,
}

impl FallbackLocator {
    /// Create a locator; `per_attempt` bounds each candidate's wait
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        candidates: impl IntoIterator<Item = Selector>,
        per_attempt: WaitOptions,
    ) -> Self {
        Self {
            name: name.into(),
            candidates: candidates.into_iter().collect(),
            per_attempt,
        }
    }

    /// Logical element name used in log lines
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The candidates in priority order
    #[must_use]
    pub fn candidates(&self) -> &[Selector] {
        &self.candidates
    }

    /// First candidate with a present element
    pub async fn first_present<D: PageDriver + ?Sized>(&self, driver: &D) -> Option<Located> {
        self.first_matching(driver, Condition::Present).await
    }

    /// First candidate with a displayed, enabled element
    pub async fn first_interactable<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
    ) -> Option<Located> {
        self.first_matching(driver, Condition::Interactable).await
    }

    async fn first_matching<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        condition: Condition,
    ) -> Option<Located> {
        for (attempt, selector) in self.candidates.iter().enumerate() {
            let found = match condition {
                Condition::Present => wait_for_present(driver, selector, &self.per_attempt).await,
                Condition::Interactable => {
                    wait_for_interactable(driver, selector, &self.per_attempt).await
                }
            };

            match found {
                Ok(element) => {
                    debug!("{}: matched {} (strategy {})", self.name, selector, attempt + 1);
                    return Some(Located {
                        element,
                        selector: selector.clone(),
                        attempt,
                    });
                }
                Err(e) if e.is_timeout() => {
                    debug!("{}: no match for {}", self.name, selector);
                }
                Err(e) => {
                    debug!("{}: {} failed: {}", self.name, selector, e);
                }
            }
        }
        None
    }

    /// Query candidates immediately, accumulating distinct elements until
    /// at least `min` are found or the list is exhausted
    ///
    /// Each candidate is queried once; the per-attempt budget is not used.
    pub async fn collect_at_least<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        min: usize,
    ) -> Vec<ElementHandle> {
        let mut collected: Vec<ElementHandle> = Vec::new();

        for selector in &self.candidates {
            match driver.query_all(selector).await {
                Ok(found) => {
                    for element in found {
                        if !collected.contains(&element) {
                            collected.push(element);
                        }
                    }
                }
                Err(e) => warn!("{} search error via {}: {}", self.name, selector, e),
            }

            if collected.len() >= min {
                break;
            }
        }
        collected
    }
}
