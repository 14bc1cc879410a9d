//! Target site knowledge.
//!
//! Everything that depends on the booking site's concrete markup:
//! URLs, locators and markers in [`pages`], HTML reading in [`parser`].

// ============================================================================
// Submodules
// ============================================================================

/// URLs, locators and marker texts.
pub mod pages;

/// Page parsing adapter.
pub mod parser;

// ============================================================================
// Re-exports
// ============================================================================

pub use parser::{PageParser, SrtParser};
