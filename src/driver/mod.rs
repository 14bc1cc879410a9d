//! Browser automation driver module.
//!
//! The hunter depends only on the [`Driver`] contract. The concrete
//! back-end ([`WebDriverSession`], W3C WebDriver through `thirtyfour`) is
//! confined to this module.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Driver`] | Narrow browser-control contract |
//! | [`By`] | Element locator strategies |
//! | [`Condition`] | Things to wait for |
//! | [`WebDriverSession`] | thirtyfour-backed implementation |
//! | [`WebDriverBuilder`] | Fluent session configuration |
//! | [`BrowserOptions`] | Browser launch options |
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use srt_hunter::driver::{By, Condition, Driver, WebDriverSession};
//!
//! # async fn example() -> srt_hunter::Result<()> {
//! let session = WebDriverSession::builder().connect().await?;
//!
//! session.navigate("https://etk.srail.kr/main.do").await?;
//! session
//!     .wait_for(&Condition::Present(By::css("body")), Duration::from_secs(10))
//!     .await?;
//! session.quit().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for WebDriver sessions.
pub mod builder;

/// The driver contract.
pub mod contract;

/// Browser launch options.
pub mod options;

/// Element locator strategies.
pub mod selector;

/// thirtyfour-backed implementation.
pub mod webdriver;

#[cfg(test)]
pub(crate) mod scripted;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::WebDriverBuilder;
pub use contract::{Condition, Driver, SelectBy};
pub use options::{BrowserKind, BrowserOptions};
pub use selector::By;
pub use webdriver::WebDriverSession;
