//! Browser session control.
//!
//! [`SessionConfig`] describes how Chromium is launched. With the `browser`
//! feature, [`ChromiumDriver`] implements [`crate::PageDriver`] over a
//! chromiumoxide CDP session.

use crate::driver::ElementHandle;
use crate::result::SlotCheckResult;
use crate::selector::Selector;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable naming the Chromium executable
pub const CHROME_PATH_ENV: &str = "CHROME_PATH";

/// Browser launch configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Run without a visible window
    pub headless: bool,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Path to the Chromium binary (None = auto-detect)
    pub chrome_path: Option<PathBuf>,
    /// Sandbox mode (disabled for containers)
    pub sandbox: bool,
    /// Additional command-line switches
    pub args: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            chrome_path: None,
            sandbox: false,
            args: vec![
                "--disable-gpu".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
        }
    }
}

impl SessionConfig {
    /// Defaults, with the executable taken from `CHROME_PATH` when set
    #[must_use]
    pub fn from_env() -> Self {
        let chrome_path = std::env::var_os(CHROME_PATH_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self {
            chrome_path,
            ..Self::default()
        }
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set window dimensions
    #[must_use]
    pub const fn with_window(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Set the Chromium executable
    #[must_use]
    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }
}

/// Keep the handles that registered, dropping nodes that detached between
/// the count and the lookup
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn keep_attached(
    selector: &Selector,
    registered: impl IntoIterator<Item = SlotCheckResult<ElementHandle>>,
) -> Vec<ElementHandle> {
    registered
        .into_iter()
        .filter_map(|result| match result {
            Ok(handle) => Some(handle),
            Err(e) => {
                debug!("{}: skipping detached node: {}", selector, e);
                None
            }
        })
        .collect()
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;

#[cfg(feature = "browser")]
mod cdp {
    use super::{keep_attached, SessionConfig};
    use crate::driver::{DomEvent, ElementHandle, PageDriver, Screenshot};
    use crate::result::{SlotCheckError, SlotCheckResult};
    use crate::selector::{js_string, Selector};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
    use chromiumoxide::element::Element;
    use chromiumoxide::error::CdpError;
    use chromiumoxide::handler::viewport::Viewport;
    use chromiumoxide::page::{Page, ScreenshotParams};
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;
    use tracing::{debug, warn};

    const TAG_NAME_FN: &str = "function() { return this.tagName.toLowerCase(); }";

    const INTERACTABLE_FN: &str = "function() {
        const style = window.getComputedStyle(this);
        const rect = this.getBoundingClientRect();
        return style.display !== 'none'
            && style.visibility !== 'hidden'
            && rect.width > 0
            && rect.height > 0
            && !this.disabled;
    }";

    const CLEAR_FN: &str = "function() { this.value = ''; }";

    fn script_err(e: CdpError) -> SlotCheckError {
        SlotCheckError::script(e.to_string())
    }

    fn input_err(e: CdpError) -> SlotCheckError {
        SlotCheckError::Input {
            message: e.to_string(),
        }
    }

    /// Chromium session driven over CDP
    ///
    /// Elements returned by queries are registered under their backend node
    /// id, so the same DOM node found through two selectors yields equal
    /// [`ElementHandle`]s.
    #[derive(Debug)]
    pub struct ChromiumDriver {
        browser: Mutex<Browser>,
        page: Page,
        elements: Mutex<HashMap<String, Arc<Element>>>,
        handler: JoinHandle<()>,
        closed: bool,
    }

    impl ChromiumDriver {
        /// Launch Chromium and open a blank page
        ///
        /// # Errors
        ///
        /// Returns error if the browser cannot be launched
        pub async fn launch(config: &SessionConfig) -> SlotCheckResult<Self> {
            let mut builder = BrowserConfig::builder()
                .window_size(config.window_width, config.window_height)
                .viewport(Viewport {
                    width: config.window_width,
                    height: config.window_height,
                    ..Viewport::default()
                });

            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chrome_path {
                builder = builder.chrome_executable(path);
            }
            for arg in &config.args {
                builder = builder.arg(arg.as_str());
            }

            let cdp_config = builder
                .build()
                .map_err(|message| SlotCheckError::BrowserLaunch { message })?;

            let (mut browser, mut handler) =
                Browser::launch(cdp_config)
                    .await
                    .map_err(|e| SlotCheckError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        debug!("CDP handler stopped: {}", e);
                        break;
                    }
                }
            });

            let page = match browser.new_page("about:blank").await {
                Ok(page) => page,
                Err(e) => {
                    let _ = browser.close().await;
                    handler.abort();
                    return Err(SlotCheckError::BrowserLaunch {
                        message: e.to_string(),
                    });
                }
            };

            debug!(
                "browser launched ({}x{}, headless: {})",
                config.window_width, config.window_height, config.headless
            );

            Ok(Self {
                browser: Mutex::new(browser),
                page,
                elements: Mutex::new(HashMap::new()),
                handler,
                closed: false,
            })
        }

        async fn element(&self, handle: &ElementHandle) -> SlotCheckResult<Arc<Element>> {
            self.elements
                .lock()
                .await
                .get(&handle.id)
                .cloned()
                .ok_or_else(|| SlotCheckError::ElementGone {
                    id: handle.id.clone(),
                })
        }

        async fn call(
            &self,
            handle: &ElementHandle,
            function: &str,
        ) -> SlotCheckResult<serde_json::Value> {
            let element = self.element(handle).await?;
            let returns = element
                .call_js_fn(function, false)
                .await
                .map_err(script_err)?;
            if let Some(details) = returns.exception_details {
                return Err(SlotCheckError::script(details.text));
            }
            Ok(returns.result.value.unwrap_or(serde_json::Value::Null))
        }

        async fn register(&self, element: Element) -> SlotCheckResult<ElementHandle> {
            let tag_name = element
                .call_js_fn(TAG_NAME_FN, false)
                .await
                .map_err(script_err)?
                .result
                .value
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            let handle = ElementHandle::new(
                format!("node-{}", element.backend_node_id.inner()),
                tag_name,
            );
            self.elements
                .lock()
                .await
                .insert(handle.id.clone(), Arc::new(element));
            Ok(handle)
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumDriver {
        async fn navigate(&mut self, url: &str) -> SlotCheckResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| SlotCheckError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            self.elements.lock().await.clear();
            Ok(())
        }

        async fn page_source(&self) -> SlotCheckResult<String> {
            self.page.content().await.map_err(script_err)
        }

        async fn evaluate(&self, script: &str) -> SlotCheckResult<serde_json::Value> {
            let result = self.page.evaluate(script).await.map_err(script_err)?;
            Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
        }

        async fn query_all(&self, selector: &Selector) -> SlotCheckResult<Vec<ElementHandle>> {
            // find_* errors on zero matches, so count first
            let count = self
                .evaluate(&selector.to_count_query())
                .await?
                .as_u64()
                .unwrap_or(0);
            if count == 0 {
                return Ok(Vec::new());
            }

            let source = selector.source();
            let lookup = if selector.is_path() {
                self.page.find_xpaths(source).await
            } else {
                self.page.find_elements(source).await
            };
            let found = match lookup {
                Ok(found) => found,
                Err(e) => {
                    debug!("{}: matches gone before lookup: {}", selector, e);
                    return Ok(Vec::new());
                }
            };

            let mut registered = Vec::with_capacity(found.len());
            for element in found {
                registered.push(self.register(element).await);
            }
            Ok(keep_attached(selector, registered))
        }

        async fn is_interactable(&self, element: &ElementHandle) -> SlotCheckResult<bool> {
            Ok(self
                .call(element, INTERACTABLE_FN)
                .await?
                .as_bool()
                .unwrap_or(false))
        }

        async fn set_property(
            &self,
            element: &ElementHandle,
            name: &str,
            value: &str,
        ) -> SlotCheckResult<()> {
            let function = format!(
                "function() {{ this[{}] = {}; }}",
                js_string(name),
                js_string(value)
            );
            self.call(element, &function).await.map(|_| ())
        }

        async fn dispatch_event(
            &self,
            element: &ElementHandle,
            event: DomEvent,
        ) -> SlotCheckResult<()> {
            let function = format!(
                "function() {{ this.dispatchEvent(new Event({}, {{ bubbles: true }})); }}",
                js_string(event.name())
            );
            self.call(element, &function).await.map(|_| ())
        }

        async fn click(&self, element: &ElementHandle) -> SlotCheckResult<()> {
            self.element(element)
                .await?
                .click()
                .await
                .map_err(input_err)?;
            Ok(())
        }

        async fn clear(&self, element: &ElementHandle) -> SlotCheckResult<()> {
            self.call(element, CLEAR_FN).await.map(|_| ())
        }

        async fn type_text(&self, element: &ElementHandle, text: &str) -> SlotCheckResult<()> {
            let target = self.element(element).await?;
            target.focus().await.map_err(input_err)?;
            target.type_str(text).await.map_err(input_err)?;
            Ok(())
        }

        async fn text(&self, element: &ElementHandle) -> SlotCheckResult<String> {
            Ok(self
                .element(element)
                .await?
                .inner_text()
                .await
                .map_err(script_err)?
                .unwrap_or_default())
        }

        async fn screenshot(&self) -> SlotCheckResult<Screenshot> {
            let params = ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .full_page(true)
                .build();
            let data = self
                .page
                .screenshot(params)
                .await
                .map_err(|e| SlotCheckError::Screenshot {
                    message: e.to_string(),
                })?;
            Ok(Screenshot::new(data))
        }

        async fn close(&mut self) -> SlotCheckResult<()> {
            if self.closed {
                return Ok(());
            }
            self.closed = true;
            self.elements.lock().await.clear();

            let browser = self.browser.get_mut();
            let result = browser.close().await;
            if let Err(e) = browser.wait().await {
                warn!("browser process did not exit cleanly: {}", e);
            }
            self.handler.abort();
            result.map(|_| ()).map_err(|e| SlotCheckError::BrowserLaunch {
                message: format!("close failed: {e}"),
            })
        }
    }

    impl Drop for ChromiumDriver {
        fn drop(&mut self) {
            if !self.closed {
                debug!("ChromiumDriver dropped without close");
            }
            self.handler.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::SlotCheckError;

    #[test]
    fn test_detached_nodes_are_skipped() {
        let selector = Selector::parse("button.slot");
        let kept = keep_attached(
            &selector,
            vec![
                Ok(ElementHandle::new("node-1", "button")),
                Err(SlotCheckError::script("Could not find node with given id")),
                Err(SlotCheckError::ElementGone {
                    id: "node-2".to_string(),
                }),
                Ok(ElementHandle::new("node-3", "button")),
            ],
        );
        let ids: Vec<_> = kept.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["node-1", "node-3"]);
    }

    #[test]
    fn test_nothing_attached() {
        let selector = Selector::parse("//button");
        let kept = keep_attached(&selector, vec![Err(SlotCheckError::script("detached"))]);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_default_matches_smoke_requirements() {
        let config = SessionConfig::default();
        assert!(config.headless);
        assert!(!config.sandbox);
        assert_eq!((config.window_width, config.window_height), (1920, 1080));
        assert!(config.args.iter().any(|a| a == "--disable-gpu"));
        assert!(config.args.iter().any(|a| a == "--disable-dev-shm-usage"));
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::default()
            .with_headless(false)
            .with_window(800, 600)
            .with_chrome_path("/usr/bin/chromium");
        assert!(!config.headless);
        assert_eq!(config.window_width, 800);
        assert_eq!(config.chrome_path, Some(PathBuf::from("/usr/bin/chromium")));
    }
}
