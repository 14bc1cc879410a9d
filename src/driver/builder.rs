//! Builder pattern for WebDriver session configuration.
//!
//! Provides a fluent API for configuring and connecting a
//! [`WebDriverSession`].
//!
//! # Example
//!
//! ```no_run
//! use srt_hunter::driver::{BrowserKind, WebDriverSession};
//!
//! # async fn example() -> srt_hunter::Result<()> {
//! let session = WebDriverSession::builder()
//!     .kind(BrowserKind::Chrome)
//!     .server_url("http://localhost:9515")
//!     .window_size(1920, 1080)
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use url::Url;

use crate::error::{Error, Result};

use super::options::{BrowserKind, BrowserOptions};
use super::webdriver::WebDriverSession;

// ============================================================================
// WebDriverBuilder
// ============================================================================

/// Builder for configuring a [`WebDriverSession`].
///
/// Use [`WebDriverSession::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct WebDriverBuilder {
    /// WebDriver server URL.
    server_url: Option<String>,
    /// Browser launch options.
    options: BrowserOptions,
}

// ============================================================================
// WebDriverBuilder Implementation
// ============================================================================

impl WebDriverBuilder {
    /// Creates a new builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the browser engine.
    #[inline]
    #[must_use]
    pub fn kind(mut self, kind: BrowserKind) -> Self {
        self.options.kind = kind;
        self
    }

    /// Sets the WebDriver server URL (chromedriver, geckodriver or a hub).
    ///
    /// Defaults to the engine's local port when unset.
    #[inline]
    #[must_use]
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Enables headless mode.
    #[inline]
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.options.headless = headless;
        self
    }

    /// Sets window size in pixels.
    #[inline]
    #[must_use]
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.options = self.options.with_window_size(width, height);
        self
    }

    /// Adds extra browser arguments.
    #[inline]
    #[must_use]
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options = self.options.with_args(args);
        self
    }

    /// Replaces all browser options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: BrowserOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates configuration and opens a browser session.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the server URL or options are invalid
    /// - [`Error::Transport`] if the WebDriver server is unreachable
    pub async fn connect(self) -> Result<WebDriverSession> {
        let url = self.validate_server_url()?;
        self.options.validate().map_err(Error::config)?;

        WebDriverSession::connect(url.as_str(), &self.options).await
    }
}

// ============================================================================
// Validation
// ============================================================================

impl WebDriverBuilder {
    /// Resolves and validates the server URL.
    fn validate_server_url(&self) -> Result<Url> {
        let raw = self
            .server_url
            .as_deref()
            .unwrap_or_else(|| self.options.kind.default_server_url());

        let url = Url::parse(raw)
            .map_err(|e| Error::config(format!("Invalid WebDriver server URL '{raw}': {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "WebDriver server URL must be http(s), got '{}'",
                url.scheme()
            )));
        }

        Ok(url)
    }
}

// ============================================================================
// Tests
// ============================================================================
