//! Booking domain: what to look for, what was found, what to claim.
//!
//! | Type | Lifetime |
//! |------|----------|
//! | [`SearchCriteria`] | whole run |
//! | [`CandidateTrain`] | one poll iteration |
//! | [`Selection`] | one poll iteration |
//! | [`Receipt`] | end of a successful run |

// ============================================================================
// Submodules
// ============================================================================

/// Trains parsed from a results page.
pub mod candidate;

/// Search criteria and their value types.
pub mod criteria;

/// Payment receipt.
pub mod receipt;

/// Selection policy.
pub mod selection;

// ============================================================================
// Re-exports
// ============================================================================

pub use candidate::{CandidateTrain, ClassAvailability, ClockTime};
pub use criteria::{MAX_PASSENGERS, SearchCriteria, SeatClass, TargetHour, TravelDate};
pub use receipt::Receipt;
pub use selection::{Selection, select};
