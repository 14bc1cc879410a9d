//! Availability poller and reservation driver.
//!
//! | File | Stage |
//! |------|-------|
//! | `hunter.rs` | `Searching`, `Claiming` |
//! | `checkout.rs` | `PaymentSetup` |
//! | `payment.rs` | `PaymentExternal` |
//! | `state.rs` | the stage machine itself |

// ============================================================================
// Submodules
// ============================================================================

/// Checkout on the confirmation page.
mod checkout;

/// Poll loop and claim.
pub mod hunter;

/// KakaoPay window and completion wait.
mod payment;

/// Stage machine and attempt record.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use hunter::Hunter;
pub use state::{AttemptOutcome, ReservationAttempt, Stage};
