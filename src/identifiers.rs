//! Type-safe identifiers for browsing contexts.
//!
//! Back-ends hand out opaque strings (WebDriver window handles, tab ids);
//! wrapping them keeps page handles from being mixed up with selectors or
//! URLs at compile time.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

// ============================================================================
// PageId
// ============================================================================

/// Identifier of one open page (tab, popup or window).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(Arc<str>);

impl PageId {
    /// Wraps a back-end handle.
    #[inline]
    #[must_use]
    pub fn new(handle: impl AsRef<str>) -> Self {
        Self(Arc::from(handle.as_ref()))
    }

    /// Returns the raw handle.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PageId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

// ============================================================================
// Tests
// ============================================================================
