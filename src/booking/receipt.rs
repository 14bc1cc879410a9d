//! Payment receipt shown on the completion page.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Receipt
// ============================================================================

/// Details scraped from the payment completion page.
///
/// Both fields are best-effort; the provider sometimes closes its window
/// before anything can be read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Paid amount as displayed (`59,800원`).
    pub amount: Option<String>,
    /// Approval timestamp as displayed.
    pub approved_at: Option<String>,
}

impl Receipt {
    /// Returns `true` if nothing could be read.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.approved_at.is_none()
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.amount, &self.approved_at) {
            (Some(amount), Some(at)) => write!(f, "{amount} ({at})"),
            (Some(amount), None) => f.write_str(amount),
            (None, Some(at)) => write!(f, "approved {at}"),
            (None, None) => f.write_str("no details"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
