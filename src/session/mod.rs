//! Session/navigation controller.
//!
//! Authenticates against the site and prepares the schedule search form.
//! Runs once, strictly before the poller.

// ============================================================================
// Submodules
// ============================================================================

/// Login and form preparation.
pub mod controller;

// ============================================================================
// Re-exports
// ============================================================================

pub use controller::SessionController;
