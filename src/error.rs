//! Error types for the ticket hunter.
//!
//! Every fallible operation returns [`Result<T>`] which uses [`Error`].
//! The poll loop never lets an error escape unclassified: each variant is
//! either retried by falling back to searching, or ends the run.
//!
//! # Usage
//!
//! ```ignore
//! use srt_hunter::{Error, Result};
//!
//! async fn submit(driver: &dyn Driver) -> Result<()> {
//!     driver.click(&By::id("search")).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants | Handling |
//! |----------|----------|----------|
//! | Configuration | [`Error::Config`], [`Error::OptionNotFound`] | fail fast before polling |
//! | Authentication | [`Error::InvalidCredentials`] | ends the run |
//! | Page | [`Error::ElementNotFound`], [`Error::PageNotFound`], [`Error::NoPaymentPage`] | step-local, back to searching |
//! | Execution | [`Error::Timeout`], [`Error::Driver`] | step-local, back to searching |
//! | Transport | [`Error::Transport`], [`Error::SessionClosed`] | ends the run, never retried |
//! | Control | [`Error::Cancelled`] | ends the run |
//! | External | [`Error::Io`], [`Error::Json`] | configuration loading |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::PageId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when configuration values fail validation.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// A dropdown does not offer the requested option.
    ///
    /// Raised while preparing the search form; the run cannot continue
    /// with a date or hour the site does not list.
    #[error("Option '{option}' not offered by {selector}")]
    OptionNotFound {
        /// Selector of the dropdown.
        selector: String,
        /// Requested label or value.
        option: String,
    },

    // ========================================================================
    // Authentication Errors
    // ========================================================================
    /// Login did not reach the signed-in page in time.
    ///
    /// A wrong password and a slow site look identical from here.
    #[error("Login failed within {timeout_ms}ms: check member id and password")]
    InvalidCredentials {
        /// Milliseconds waited for the post-login page.
        timeout_ms: u64,
    },

    // ========================================================================
    // Page Errors
    // ========================================================================
    /// Element not found by selector.
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Selector used.
        selector: String,
    },

    /// Browsing context does not exist (closed or never opened).
    #[error("Page not found: {page_id}")]
    PageNotFound {
        /// The missing page.
        page_id: PageId,
    },

    /// The payment provider never opened its page.
    #[error("Payment provider page did not open")]
    NoPaymentPage,

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Operation timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Any other failure reported by the automation back-end.
    #[error("Driver error: {message}")]
    Driver {
        /// Message reported by the back-end.
        message: String,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Network or connection failure between us and the browser or site.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The automation session is gone (browser closed underneath us).
    #[error("Browser session closed")]
    SessionClosed,

    // ========================================================================
    // Control Errors
    // ========================================================================
    /// The caller requested a stop.
    #[error("Stopped by request")]
    Cancelled,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an option not found error.
    #[inline]
    pub fn option_not_found(selector: impl Into<String>, option: impl Into<String>) -> Self {
        Self::OptionNotFound {
            selector: selector.into(),
            option: option.into(),
        }
    }

    /// Creates an invalid credentials error.
    #[inline]
    pub fn invalid_credentials(timeout_ms: u64) -> Self {
        Self::InvalidCredentials { timeout_ms }
    }

    /// Creates an element not found error.
    #[inline]
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
        }
    }

    /// Creates a page not found error.
    #[inline]
    pub fn page_not_found(page_id: PageId) -> Self {
        Self::PageNotFound { page_id }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a driver error.
    #[inline]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the connection to the browser or site is broken.
    ///
    /// These end the run immediately and are never retried.
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::SessionClosed)
    }

    /// Returns `true` for configuration mistakes that must fail before polling.
    #[inline]
    #[must_use]
    pub fn is_fatal_config(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::OptionNotFound { .. })
    }

    /// Returns `true` if the failure is confined to one page interaction.
    ///
    /// The poll loop recovers from these by returning to searching.
    #[inline]
    #[must_use]
    pub fn is_step_local(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. }
                | Self::PageNotFound { .. }
                | Self::NoPaymentPage
                | Self::Timeout { .. }
                | Self::Driver { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
