//! PageDriver - abstract browser automation trait
//!
//! The runner talks to the page only through [`PageDriver`], so the same
//! procedure runs against a real Chromium session ([`ChromiumDriver`](crate::ChromiumDriver),
//! behind the `browser` feature) or against the in-memory [`MockDriver`].

use crate::result::{SlotCheckError, SlotCheckResult};
use crate::selector::Selector;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// PNG signature, the mock's screenshot bytes
const PNG_MAGIC: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];

/// Element handle for DOM interactions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-scoped identifier for the element
    pub id: String,
    /// Element tag name (lowercase)
    pub tag_name: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
        }
    }
}

/// DOM events the runner synthesizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEvent {
    /// `input`, observed by two-way bindings
    Input,
    /// `click`
    Click,
}

impl DomEvent {
    /// The DOM event type string
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Click => "click",
        }
    }
}

/// Captured page image
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Abstract driver trait for browser automation
///
/// # Implementations
///
/// - `ChromiumDriver` - CDP session via chromiumoxide (feature `browser`)
/// - `MockDriver` - in-memory page for unit and integration tests
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&mut self, url: &str) -> SlotCheckResult<()>;

    /// Full document markup
    async fn page_source(&self) -> SlotCheckResult<String>;

    /// Evaluate a JavaScript expression in page context
    async fn evaluate(&self, script: &str) -> SlotCheckResult<serde_json::Value>;

    /// All elements currently matching the selector, in document order
    async fn query_all(&self, selector: &Selector) -> SlotCheckResult<Vec<ElementHandle>>;

    /// Whether the element is displayed and enabled
    async fn is_interactable(&self, element: &ElementHandle) -> SlotCheckResult<bool>;

    /// Assign a DOM property without firing any event
    async fn set_property(
        &self,
        element: &ElementHandle,
        name: &str,
        value: &str,
    ) -> SlotCheckResult<()>;

    /// Fire a bubbling DOM event at the element
    async fn dispatch_event(&self, element: &ElementHandle, event: DomEvent)
        -> SlotCheckResult<()>;

    /// Native (pointer) click
    async fn click(&self, element: &ElementHandle) -> SlotCheckResult<()>;

    /// Clear an input's value
    async fn clear(&self, element: &ElementHandle) -> SlotCheckResult<()>;

    /// Type text with native key events
    async fn type_text(&self, element: &ElementHandle, text: &str) -> SlotCheckResult<()>;

    /// Rendered text of the element
    async fn text(&self, element: &ElementHandle) -> SlotCheckResult<String>;

    /// Full-page PNG screenshot
    async fn screenshot(&self) -> SlotCheckResult<Screenshot>;

    /// Release the browser session
    async fn close(&mut self) -> SlotCheckResult<()>;

    /// `document.readyState`
    async fn ready_state(&self) -> SlotCheckResult<String> {
        let value = self.evaluate("document.readyState").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Number of elements currently matching
    async fn count(&self, selector: &Selector) -> SlotCheckResult<usize> {
        Ok(self.query_all(selector).await?.len())
    }
}

// ============================================================================
// Mock driver
// ============================================================================

/// An element of the mock page
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Handle returned by queries
    pub handle: ElementHandle,
    /// Rendered text
    pub text: String,
    /// Selector sources (see [`Selector::source`]) this element matches
    pub matches: Vec<String>,
    /// Displayed and enabled
    pub interactable: bool,
    /// Hidden until the element with this id receives a click
    pub revealed_by: Option<String>,
    /// Hidden until this many queries have been made
    pub appears_after_queries: u32,
}

impl MockElement {
    /// Create a visible, interactable element
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            handle: ElementHandle::new(id, tag_name),
            text: String::new(),
            matches: Vec::new(),
            interactable: true,
            revealed_by: None,
            appears_after_queries: 0,
        }
    }

    /// Make the element match a selector candidate
    #[must_use]
    pub fn matching(mut self, raw: &str) -> Self {
        self.matches.push(Selector::parse(raw).source());
        self
    }

    /// Set rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Present but not displayed/enabled
    #[must_use]
    pub const fn not_interactable(mut self) -> Self {
        self.interactable = false;
        self
    }

    /// Only rendered after `trigger_id` is clicked
    #[must_use]
    pub fn revealed_by(mut self, trigger_id: impl Into<String>) -> Self {
        self.revealed_by = Some(trigger_id.into());
        self
    }

    /// Only rendered after `n` queries
    #[must_use]
    pub const fn appearing_after(mut self, n: u32) -> Self {
        self.appears_after_queries = n;
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    current_url: String,
    queries: u32,
    clicked: Vec<String>,
    values: HashMap<String, String>,
    call_history: Vec<String>,
    closed: bool,
}

/// Mock driver for tests
///
/// Keeps interaction state behind a mutex so the `&self` trait methods can
/// record calls.
#[derive(Debug)]
pub struct MockDriver {
    elements: Vec<MockElement>,
    page_source: String,
    ready_state: String,
    js_results: Vec<(String, serde_json::Value)>,
    screenshot_data: Option<Vec<u8>>,
    fail_navigation: bool,
    state: Mutex<MockState>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            page_source: "<html><head></head><body></body></html>".to_string(),
            ready_state: "complete".to_string(),
            js_results: Vec::new(),
            screenshot_data: Some(PNG_MAGIC.to_vec()),
            fail_navigation: false,
            state: Mutex::new(MockState::default()),
        }
    }
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mock element
    pub fn add_element(&mut self, element: MockElement) {
        self.elements.push(element);
    }

    /// Builder form of [`Self::add_element`]
    #[must_use]
    pub fn with_element(mut self, element: MockElement) -> Self {
        self.add_element(element);
        self
    }

    /// Set the document markup
    #[must_use]
    pub fn with_page_source(mut self, html: impl Into<String>) -> Self {
        self.page_source = html.into();
        self
    }

    /// Set the reported `document.readyState`
    #[must_use]
    pub fn with_ready_state(mut self, state: impl Into<String>) -> Self {
        self.ready_state = state.into();
        self
    }

    /// Answer scripts containing `needle` with `value`
    #[must_use]
    pub fn with_js_result(mut self, needle: impl Into<String>, value: serde_json::Value) -> Self {
        self.js_results.push((needle.into(), value));
        self
    }

    /// Make screenshots fail
    #[must_use]
    pub fn without_screenshot(mut self) -> Self {
        self.screenshot_data = None;
        self
    }

    /// Make navigation fail
    #[must_use]
    pub const fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_rendered(element: &MockElement, state: &MockState) -> bool {
        let revealed = element
            .revealed_by
            .as_ref()
            .map_or(true, |trigger| state.clicked.contains(trigger));
        revealed && state.queries >= element.appears_after_queries
    }

    fn rendered(&self, handle: &ElementHandle) -> SlotCheckResult<MockElement> {
        let state = self.state();
        self.elements
            .iter()
            .find(|e| e.handle.id == handle.id && Self::is_rendered(e, &state))
            .cloned()
            .ok_or_else(|| SlotCheckError::ElementGone {
                id: handle.id.clone(),
            })
    }

    fn record(&self, call: String) {
        self.state().call_history.push(call);
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_history.iter().any(|c| c.starts_with(method))
    }

    /// Current value assigned to an element
    #[must_use]
    pub fn value_of(&self, id: &str) -> Option<String> {
        self.state().values.get(id).cloned()
    }

    /// Ids of elements that received a native or synthetic click, in order
    #[must_use]
    pub fn clicked(&self) -> Vec<String> {
        self.state().clicked.clone()
    }

    /// Current URL
    #[must_use]
    pub fn current_url(&self) -> String {
        self.state().current_url.clone()
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> SlotCheckResult<()> {
        self.record(format!("navigate:{url}"));
        if self.fail_navigation {
            return Err(SlotCheckError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }
        self.state().current_url = url.to_string();
        Ok(())
    }

    async fn page_source(&self) -> SlotCheckResult<String> {
        self.record("page_source".to_string());
        Ok(self.page_source.clone())
    }

    async fn evaluate(&self, script: &str) -> SlotCheckResult<serde_json::Value> {
        Ok(self
            .js_results
            .iter()
            .find(|(needle, _)| script.contains(needle.as_str()))
            .map_or(serde_json::Value::Null, |(_, v)| v.clone()))
    }

    async fn query_all(&self, selector: &Selector) -> SlotCheckResult<Vec<ElementHandle>> {
        let source = selector.source();
        let mut state = self.state();
        state.queries += 1;
        Ok(self
            .elements
            .iter()
            .filter(|e| e.matches.contains(&source) && Self::is_rendered(e, &state))
            .map(|e| e.handle.clone())
            .collect())
    }

    async fn is_interactable(&self, element: &ElementHandle) -> SlotCheckResult<bool> {
        Ok(self.rendered(element)?.interactable)
    }

    async fn set_property(
        &self,
        element: &ElementHandle,
        name: &str,
        value: &str,
    ) -> SlotCheckResult<()> {
        self.rendered(element)?;
        self.record(format!("set:{}:{name}={value}", element.id));
        if name == "value" {
            self.state()
                .values
                .insert(element.id.clone(), value.to_string());
        }
        Ok(())
    }

    async fn dispatch_event(
        &self,
        element: &ElementHandle,
        event: DomEvent,
    ) -> SlotCheckResult<()> {
        self.rendered(element)?;
        self.record(format!("dispatch:{}:{}", event.name(), element.id));
        if event == DomEvent::Click {
            self.state().clicked.push(element.id.clone());
        }
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> SlotCheckResult<()> {
        if !self.rendered(element)?.interactable {
            return Err(SlotCheckError::Input {
                message: format!("element {} is not interactable", element.id),
            });
        }
        self.record(format!("click:{}", element.id));
        self.state().clicked.push(element.id.clone());
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> SlotCheckResult<()> {
        self.rendered(element)?;
        self.record(format!("clear:{}", element.id));
        self.state().values.insert(element.id.clone(), String::new());
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> SlotCheckResult<()> {
        self.rendered(element)?;
        self.record(format!("type:{}:{text}", element.id));
        self.state()
            .values
            .entry(element.id.clone())
            .or_default()
            .push_str(text);
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> SlotCheckResult<String> {
        Ok(self.rendered(element)?.text)
    }

    async fn screenshot(&self) -> SlotCheckResult<Screenshot> {
        self.record("screenshot".to_string());
        self.screenshot_data
            .clone()
            .map(Screenshot::new)
            .ok_or_else(|| SlotCheckError::Screenshot {
                message: "No mock screenshot set".to_string(),
            })
    }

    async fn close(&mut self) -> SlotCheckResult<()> {
        self.record("close".to_string());
        self.state().closed = true;
        Ok(())
    }

    async fn ready_state(&self) -> SlotCheckResult<String> {
        Ok(self.ready_state.clone())
    }
}
