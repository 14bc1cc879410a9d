//! SRT hunter - seat watcher and checkout driver for SRT train tickets.
//!
//! Logs in to the booking site, polls the schedule search until a train
//! inside the configured departure window has a reservable seat, claims
//! it, then drives checkout and the KakaoPay request. Losing the seat to
//! another buyer sends the hunter back to searching.
//!
//! # Architecture
//!
//! ```text
//! runner ─▶ session (login, search form)
//!        └▶ reservation::Hunter ─▶ site::PageParser ─▶ booking::select
//!                              └▶ driver::Driver (thirtyfour)
//! ```
//!
//! The hunter talks to the browser only through the [`Driver`] contract
//! and reads pages only through the [`PageParser`] adapter, so the whole
//! state machine runs against scripted doubles in tests.
//!
//! # Quick Start
//!
//! ```no_run
//! use srt_hunter::{Config, Progress, SrtParser, StopSignal, runner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("srt.json")?;
//!     let parser = SrtParser::new()?;
//!     let progress = Progress::new();
//!
//!     let outcome =
//!         runner::run_with_browser(&config, &parser, &progress, &StopSignal::new()).await;
//!     println!("{}: {}", outcome.success, outcome.reason);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`booking`] | Criteria, candidates, selection policy, receipt |
//! | [`config`] | JSON configuration and wait budgets |
//! | [`control`] | Progress narration and stop signal |
//! | [`driver`] | Browser contract and the WebDriver back-end |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`reservation`] | Poll loop, claim, checkout, payment |
//! | [`runner`] | One run from connect to teardown |
//! | [`session`] | Login and search form |
//! | [`site`] | URLs, locators and page parsing |

// ============================================================================
// Modules
// ============================================================================

/// Booking domain types and the selection policy.
pub mod booking;

/// Configuration file and timing budgets.
pub mod config;

/// Progress narration and cooperative cancellation.
pub mod control;

/// Browser automation contract and back-end.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for browser entities.
pub mod identifiers;

/// Availability poller and reservation driver.
pub mod reservation;

/// Run orchestration.
pub mod runner;

/// Session/navigation controller.
pub mod session;

/// Target site knowledge.
pub mod site;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Booking types
pub use booking::{CandidateTrain, Receipt, SearchCriteria, SeatClass, Selection, select};

// Configuration
pub use config::{Config, Credentials, PaymentContact, Settings, Timings};

// Control
pub use control::{Progress, StopSignal};

// Driver types
pub use driver::{By, Driver, WebDriverSession};

// Error types
pub use error::{Error, Result};

// Reservation
pub use reservation::{AttemptOutcome, Hunter, ReservationAttempt, Stage};

// Run orchestration
pub use runner::RunOutcome;

// Site
pub use site::{PageParser, SrtParser};
