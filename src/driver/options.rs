//! Browser launch options.
//!
//! Type-safe description of the browser the WebDriver server should start:
//! which engine, headless or not, window size and extra arguments.
//!
//! # Example
//!
//! ```ignore
//! use srt_hunter::driver::{BrowserKind, BrowserOptions};
//!
//! let options = BrowserOptions::new(BrowserKind::Chrome)
//!     .with_window_size(1920, 1080)
//!     .with_arg("--lang=ko-KR");
//!
//! let args = options.to_args();
//! // ["--window-size=1920,1080", "--lang=ko-KR"]
//! ```

use serde::Deserialize;

// ============================================================================
// BrowserKind
// ============================================================================

/// Browser engine driven through WebDriver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Chrome via chromedriver.
    #[default]
    Chrome,
    /// Firefox via geckodriver.
    Firefox,
}

impl BrowserKind {
    /// Default local WebDriver server URL for this engine.
    #[must_use]
    pub const fn default_server_url(self) -> &'static str {
        match self {
            Self::Chrome => "http://localhost:9515",
            Self::Firefox => "http://localhost:4444",
        }
    }
}

// ============================================================================
// BrowserOptions
// ============================================================================

/// Browser process configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserOptions {
    /// Engine to drive.
    pub kind: BrowserKind,

    /// Run without a visible window.
    ///
    /// The payment step needs a human watching the phone, not the
    /// browser, so headless runs work end to end.
    pub headless: bool,

    /// Window dimensions in pixels (width, height).
    pub window_size: Option<(u32, u32)>,

    /// Additional command-line arguments.
    pub extra_args: Vec<String>,
}

// ============================================================================
// Constructors
// ============================================================================

impl BrowserOptions {
    /// Creates options for an engine with default settings.
    #[inline]
    #[must_use]
    pub fn new(kind: BrowserKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl BrowserOptions {
    /// Enables headless mode.
    #[inline]
    #[must_use]
    pub fn with_headless(mut self) -> Self {
        self.headless = true;
        self
    }

    /// Sets window size in pixels.
    #[inline]
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some((width, height));
        self
    }

    /// Adds a custom command-line argument.
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Adds multiple custom command-line arguments.
    #[inline]
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }
}

// ============================================================================
// Conversion Methods
// ============================================================================

impl BrowserOptions {
    /// Converts options to browser command-line arguments.
    ///
    /// Headless mode is not included; it goes through the capability API.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(1 + self.extra_args.len());

        if let Some((width, height)) = self.window_size {
            match self.kind {
                BrowserKind::Chrome => args.push(format!("--window-size={width},{height}")),
                BrowserKind::Firefox => {
                    args.push(format!("--width={width}"));
                    args.push(format!("--height={height}"));
                }
            }
        }

        args.extend(self.extra_args.clone());
        args
    }

    /// Validates the options configuration.
    ///
    /// # Errors
    ///
    /// Returns error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if let Some((width, height)) = self.window_size
            && (width == 0 || height == 0)
        {
            return Err("Window dimensions must be greater than zero".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
