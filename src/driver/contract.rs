//! Automation driver contract.
//!
//! The hunter talks to the browser only through [`Driver`]. A back-end
//! implements the primitive operations plus [`Driver::check`]; waiting is
//! built on top of `check` so every back-end shares the same timeout
//! behavior.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::PageId;

use super::selector::By;

// ============================================================================
// Constants
// ============================================================================

/// Interval between condition checks inside [`Driver::wait_for`].
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// Condition
// ============================================================================

/// Something [`Driver::wait_for`] can wait on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// At least one element matches.
    Present(By),
    /// At least one matching element is displayed.
    Visible(By),
    /// The active page URL contains the fragment.
    UrlContains(String),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(by) => write!(f, "presence of {by}"),
            Self::Visible(by) => write!(f, "visibility of {by}"),
            Self::UrlContains(fragment) => write!(f, "url containing '{fragment}'"),
        }
    }
}

// ============================================================================
// SelectBy
// ============================================================================

/// How to pick an `<option>` in a `<select>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectBy {
    /// Visible option text.
    Label(String),
    /// The option's `value` attribute.
    Value(String),
}

impl SelectBy {
    /// Returns the label or value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Label(s) | Self::Value(s) => s,
        }
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Narrow browser-control contract the hunter depends on.
///
/// All operations act on the active page. Implementations report broken
/// connections as [`Error::Transport`] or [`Error::SessionClosed`] and
/// missing elements as [`Error::ElementNotFound`], so the poll loop can
/// tell fatal failures from transient ones.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Loads a URL in the active page.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Goes back one entry in the active page's history.
    async fn back(&self) -> Result<()>;

    /// Returns the active page URL.
    async fn current_url(&self) -> Result<String>;

    /// Returns the active page's serialized DOM.
    async fn page_source(&self) -> Result<String>;

    /// Clears an input and types text into it.
    async fn fill(&self, by: &By, text: &str) -> Result<()>;

    /// Clicks an element.
    async fn click(&self, by: &By) -> Result<()>;

    /// Returns an element's visible text.
    async fn read_text(&self, by: &By) -> Result<String>;

    /// Picks an option of a `<select>`.
    ///
    /// Fails with [`Error::OptionNotFound`] when no option matches.
    async fn select_option(&self, by: &By, option: &SelectBy) -> Result<()>;

    /// Accepts a pending native dialog (alert/confirm).
    ///
    /// Returns `false` when no dialog was open.
    async fn accept_next_dialog(&self) -> Result<bool>;

    /// Lists open pages in opening order.
    async fn list_open_pages(&self) -> Result<Vec<PageId>>;

    /// Returns the active page.
    async fn current_page(&self) -> Result<PageId>;

    /// Makes a page active.
    async fn switch_to(&self, page: &PageId) -> Result<()>;

    /// Closes the active page.
    async fn close_page(&self) -> Result<()>;

    /// Ends the automation session.
    async fn quit(&self) -> Result<()>;

    /// Evaluates a condition once.
    async fn check(&self, condition: &Condition) -> Result<bool>;

    /// Waits until a condition holds or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] when the condition never held
    /// - any transport error raised while checking
    async fn wait_for(&self, condition: &Condition, timeout: Duration) -> Result<()> {
        debug!(condition = %condition, timeout_ms = timeout.as_millis() as u64, "Waiting");

        let deadline = Instant::now() + timeout;
        loop {
            if self.check(condition).await? {
                return Ok(());
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::timeout(
                    condition.to_string(),
                    timeout.as_millis() as u64,
                ));
            }
            sleep(WAIT_POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    /// Waits for an element to appear, then clicks it.
    async fn click_when_ready(&self, by: &By, timeout: Duration) -> Result<()> {
        self.wait_for(&Condition::Present(by.clone()), timeout)
            .await?;
        self.click(by).await
    }

    /// Waits for an element to appear, then fills it.
    async fn fill_when_ready(&self, by: &By, text: &str, timeout: Duration) -> Result<()> {
        self.wait_for(&Condition::Present(by.clone()), timeout)
            .await?;
        self.fill(by, text).await
    }
}

// ============================================================================
// Tests
// ============================================================================
