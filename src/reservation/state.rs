//! Checkout stage machine.
//!
//! ```text
//! Searching ──match──▶ Claiming ──seat held──▶ PaymentSetup ──submitted──▶ PaymentExternal ──▶ Done
//!     ▲                   │                         │                        │  ▲
//!     └────lost race──────┘                         │                        └──┘ soft deadline
//!     └──────────────checkout control missing───────┘
//!
//! any non-terminal stage ──transport failure──▶ Aborted
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tracing::{debug, warn};

use crate::booking::{CandidateTrain, Receipt, SeatClass};

// ============================================================================
// Stage
// ============================================================================

/// Where a run is in the booking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Polling the schedule search.
    Searching,
    /// Reserve clicked, waiting to learn whether the seat is ours.
    Claiming,
    /// Seat held; filling checkout.
    PaymentSetup,
    /// Payment submitted; waiting for the provider.
    PaymentExternal,
    /// Ticket purchased.
    Done,
    /// Run ended by an unrecoverable error.
    Aborted,
}

impl Stage {
    /// Returns `true` for stages that end the run.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns `true` if the machine may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Stage) -> bool {
        match (self, next) {
            (Self::Done | Self::Aborted, _) => false,
            (_, Self::Aborted) => true,
            (Self::Searching, Self::Searching | Self::Claiming) => true,
            (Self::Claiming, Self::PaymentSetup | Self::Searching) => true,
            (Self::PaymentSetup, Self::PaymentExternal | Self::Searching) => true,
            (Self::PaymentExternal, Self::PaymentExternal | Self::Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Searching => "SEARCHING",
            Self::Claiming => "CLAIMING",
            Self::PaymentSetup => "PAYMENT_SETUP",
            Self::PaymentExternal => "PAYMENT_EXTERNAL",
            Self::Done => "DONE",
            Self::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

// ============================================================================
// AttemptOutcome
// ============================================================================

/// How one claim ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Ticket purchased.
    Purchased(Receipt),
    /// Someone else got the seat first.
    LostRace,
    /// A required checkout control was missing; the claim was dropped.
    Abandoned(String),
}

impl AttemptOutcome {
    /// Stage the run is in after this outcome.
    #[must_use]
    pub const fn next_stage(&self) -> Stage {
        match self {
            Self::Purchased(_) => Stage::Done,
            Self::LostRace | Self::Abandoned(_) => Stage::Searching,
        }
    }
}

// ============================================================================
// ReservationAttempt
// ============================================================================

/// One claim-and-checkout cycle.
///
/// Stages only move forward along [`Stage::can_transition_to`]; once an
/// attempt is concluded it accepts no further transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationAttempt {
    train: CandidateTrain,
    class: SeatClass,
    stages: Vec<Stage>,
    outcome: Option<AttemptOutcome>,
}

impl ReservationAttempt {
    /// Starts an attempt on a selected seat, in [`Stage::Claiming`].
    #[must_use]
    pub fn new(train: CandidateTrain, class: SeatClass) -> Self {
        Self {
            train,
            class,
            stages: vec![Stage::Claiming],
            outcome: None,
        }
    }

    /// Current stage.
    #[inline]
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::Claiming)
    }

    /// Every stage entered, in order.
    #[inline]
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// The claimed train.
    #[inline]
    #[must_use]
    pub fn train(&self) -> &CandidateTrain {
        &self.train
    }

    /// The claimed class.
    #[inline]
    #[must_use]
    pub fn class(&self) -> SeatClass {
        self.class
    }

    /// How the attempt ended, once concluded.
    #[inline]
    #[must_use]
    pub fn outcome(&self) -> Option<&AttemptOutcome> {
        self.outcome.as_ref()
    }

    /// Returns `true` once the attempt has left checkout.
    #[inline]
    #[must_use]
    pub fn is_concluded(&self) -> bool {
        self.outcome.is_some() || self.stage() == Stage::Aborted
    }

    /// Moves to `next`. Illegal or post-conclusion moves are refused.
    pub fn advance(&mut self, next: Stage) -> bool {
        let current = self.stage();
        if self.is_concluded() || !current.can_transition_to(next) {
            warn!(from = %current, to = %next, "Refused stage transition");
            return false;
        }
        debug!(train = %self.train, from = %current, to = %next, "Stage transition");
        self.stages.push(next);
        true
    }

    /// Ends the attempt with an outcome.
    pub fn conclude(&mut self, outcome: AttemptOutcome) -> bool {
        if !self.advance(outcome.next_stage()) {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }

    /// Ends the attempt because the run is over.
    pub fn abort(&mut self) -> bool {
        self.advance(Stage::Aborted)
    }
}

// ============================================================================
// Tests
// ============================================================================
