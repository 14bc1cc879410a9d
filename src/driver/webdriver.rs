//! WebDriver back-end built on `thirtyfour`.
//!
//! Translates the [`Driver`] contract into W3C WebDriver commands against
//! chromedriver or geckodriver. This is the only place that knows which
//! automation technology runs the browser.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use thirtyfour::{By as WdBy, WindowHandle};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::identifiers::PageId;

use super::builder::WebDriverBuilder;
use super::contract::{Condition, Driver, SelectBy};
use super::options::{BrowserKind, BrowserOptions};
use super::selector::{By, xpath_literal};

// ============================================================================
// WebDriverSession
// ============================================================================

/// A live WebDriver session owning one browser.
///
/// The session is used by exactly one run and released with
/// [`Driver::quit`].
pub struct WebDriverSession {
    /// thirtyfour handle (cheap to clone, shared connection).
    driver: WebDriver,
    /// Page ids handed out so far, mapped to their window handles.
    handles: Mutex<FxHashMap<PageId, WindowHandle>>,
}

impl fmt::Debug for WebDriverSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDriverSession")
            .field("known_pages", &self.handles.lock().len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// WebDriverSession - Constructor
// ============================================================================

impl WebDriverSession {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> WebDriverBuilder {
        WebDriverBuilder::new()
    }

    /// Opens a new browser session on a WebDriver server.
    pub(crate) async fn connect(server_url: &str, options: &BrowserOptions) -> Result<Self> {
        debug!(server_url, kind = ?options.kind, headless = options.headless, "Opening WebDriver session");

        let driver = match options.kind {
            BrowserKind::Chrome => {
                let mut caps = DesiredCapabilities::chrome();
                if options.headless {
                    caps.set_headless()?;
                }
                for arg in options.to_args() {
                    caps.add_arg(&arg)?;
                }
                WebDriver::new(server_url, caps).await?
            }
            BrowserKind::Firefox => {
                let mut caps = DesiredCapabilities::firefox();
                if options.headless {
                    caps.set_headless()?;
                }
                for arg in options.to_args() {
                    caps.add_arg(&arg)?;
                }
                WebDriver::new(server_url, caps).await?
            }
        };

        info!(server_url, "WebDriver session opened");

        Ok(Self {
            driver,
            handles: Mutex::new(FxHashMap::default()),
        })
    }
}

// ============================================================================
// WebDriverSession - Helpers
// ============================================================================

impl WebDriverSession {
    /// Records a window handle and returns its page id.
    fn register(&self, handle: WindowHandle) -> PageId {
        let id = PageId::new(handle.to_string());
        self.handles.lock().insert(id.clone(), handle);
        id
    }

    /// Finds the first element matching `by`.
    async fn find(&self, by: &By) -> Result<WebElement> {
        self.driver
            .find(locator(by))
            .await
            .map_err(|e| element_error(by, e))
    }
}

// ============================================================================
// Driver Implementation
// ============================================================================

#[async_trait]
impl Driver for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        debug!(url = %url, "Navigating");
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn back(&self) -> Result<()> {
        debug!("Navigating back");
        self.driver.back().await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.driver.source().await?)
    }

    async fn fill(&self, by: &By, text: &str) -> Result<()> {
        debug!(selector = %by, len = text.len(), "Filling");
        let element = self.find(by).await?;
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn click(&self, by: &By) -> Result<()> {
        debug!(selector = %by, "Clicking");
        let element = self.find(by).await?;

        // Overlays on the schedule page intercept native clicks.
        if let Err(e) = element.click().await {
            debug!(selector = %by, error = %e, "Native click failed, using script click");
            self.driver
                .execute("arguments[0].click();", vec![element.to_json()?])
                .await?;
        }
        Ok(())
    }

    async fn read_text(&self, by: &By) -> Result<String> {
        let element = self.find(by).await?;
        Ok(element.text().await?)
    }

    async fn select_option(&self, by: &By, option: &SelectBy) -> Result<()> {
        debug!(selector = %by, option = option.as_str(), "Selecting option");
        let select = self.find(by).await?;

        let option_path = match option {
            SelectBy::Label(label) => {
                format!(".//option[normalize-space(.)={}]", xpath_literal(label))
            }
            SelectBy::Value(value) => format!(".//option[@value={}]", xpath_literal(value)),
        };

        let options = select.find_all(WdBy::XPath(option_path)).await?;
        let first = options
            .into_iter()
            .next()
            .ok_or_else(|| Error::option_not_found(by.to_string(), option.as_str()))?;
        first.click().await?;
        Ok(())
    }

    async fn accept_next_dialog(&self) -> Result<bool> {
        match self.driver.accept_alert().await {
            Ok(()) => {
                debug!("Accepted dialog");
                Ok(true)
            }
            Err(e) if e.to_string().to_lowercase().contains("no such alert") => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_open_pages(&self) -> Result<Vec<PageId>> {
        let handles = self.driver.windows().await?;
        Ok(handles.into_iter().map(|h| self.register(h)).collect())
    }

    async fn current_page(&self) -> Result<PageId> {
        let handle = self.driver.window().await?;
        Ok(self.register(handle))
    }

    async fn switch_to(&self, page: &PageId) -> Result<()> {
        let handle = self
            .handles
            .lock()
            .get(page)
            .cloned()
            .ok_or_else(|| Error::page_not_found(page.clone()))?;

        debug!(page = %page, "Switching page");
        self.driver.switch_to_window(handle).await?;
        Ok(())
    }

    async fn close_page(&self) -> Result<()> {
        let handle = self.driver.window().await?;
        let id = PageId::new(handle.to_string());
        debug!(page = %id, "Closing page");
        self.driver.close_window().await?;
        self.handles.lock().remove(&id);
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        info!("Ending WebDriver session");
        self.driver.clone().quit().await?;
        Ok(())
    }

    async fn check(&self, condition: &Condition) -> Result<bool> {
        match condition {
            Condition::Present(by) => Ok(!self.driver.find_all(locator(by)).await?.is_empty()),
            Condition::Visible(by) => {
                for element in self.driver.find_all(locator(by)).await? {
                    if element.is_displayed().await.unwrap_or(false) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::UrlContains(fragment) => {
                Ok(self.current_url().await?.contains(fragment.as_str()))
            }
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

impl From<WebDriverError> for Error {
    fn from(err: WebDriverError) -> Self {
        classify(&err.to_string())
    }
}

/// Sorts a WebDriver failure message into the crate taxonomy.
fn classify(message: &str) -> Error {
    let lower = message.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["invalid session id", "session deleted", "chrome not reachable", "disconnected"]) {
        Error::SessionClosed
    } else if has(&[
        "connection refused",
        "connection reset",
        "connection aborted",
        "error sending request",
        "failed to establish",
        "dns error",
        "tcp connect",
        "broken pipe",
        "net::err_",
    ]) {
        Error::transport(message)
    } else if has(&["no such window", "target window already closed", "web view not found"]) {
        Error::page_not_found(PageId::new("active"))
    } else if has(&[
        "no such element",
        "stale element",
        "element not interactable",
        "element click intercepted",
    ]) {
        Error::element_not_found(message)
    } else if has(&["timeout", "timed out"]) {
        Error::timeout(message, 0)
    } else {
        Error::driver(message)
    }
}

/// Maps a lookup failure, keeping the selector in the message.
fn element_error(by: &By, err: WebDriverError) -> Error {
    match Error::from(err) {
        Error::ElementNotFound { .. } => Error::element_not_found(by.to_string()),
        other => other,
    }
}

/// Converts a crate selector into a thirtyfour locator.
fn locator(by: &By) -> WdBy {
    match by.clone() {
        By::Css(s) => WdBy::Css(s),
        By::Id(s) => WdBy::Id(s),
        By::Name(s) => WdBy::Name(s),
        By::XPath(s) => WdBy::XPath(s),
    }
}

// ============================================================================
// Tests
// ============================================================================
