//! Candidate selection policy.
//!
//! A train is eligible when its category is the target network, it leaves
//! at or after `target_hour:00` but no more than `tolerance` minutes later,
//! and at least one requested class is bookable. Among eligible trains the
//! smallest delay wins; ties go to the earlier row, and within a row
//! premium beats standard.

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::driver::By;

use super::candidate::CandidateTrain;
use super::criteria::{SearchCriteria, SeatClass};

// ============================================================================
// Selection
// ============================================================================

/// The seat chosen in one iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a> {
    /// The chosen train.
    pub train: &'a CandidateTrain,
    /// Class to claim.
    pub class: SeatClass,
    /// Reserve control to click.
    pub action: &'a By,
    /// Minutes between `target_hour:00` and departure.
    pub delta_minutes: u32,
}

// ============================================================================
// Policy
// ============================================================================

/// Minutes after the target hour, if the departure is inside the window.
///
/// Earlier departures are never inside the window, whatever the tolerance.
#[must_use]
pub fn window_delta(train: &CandidateTrain, criteria: &SearchCriteria) -> Option<u32> {
    let delta = train
        .departure
        .minutes()
        .checked_sub(criteria.target_hour.minutes())?;
    (delta <= criteria.tolerance_minutes).then_some(delta)
}

/// Most preferred requested class that is bookable on `train`.
#[must_use]
pub fn preferred_class<'a>(
    train: &'a CandidateTrain,
    criteria: &SearchCriteria,
) -> Option<(SeatClass, &'a By)> {
    SeatClass::PREFERENCE
        .into_iter()
        .filter(|class| criteria.accepts(*class))
        .find_map(|class| train.action_for(class).map(|action| (class, action)))
}

/// Picks the seat to claim, or `None` if nothing is eligible.
#[must_use]
pub fn select<'a>(
    candidates: &'a [CandidateTrain],
    criteria: &SearchCriteria,
    network: &str,
) -> Option<Selection<'a>> {
    let mut best: Option<Selection<'a>> = None;

    for train in candidates {
        if train.category != network {
            continue;
        }
        let Some(delta) = window_delta(train, criteria) else {
            continue;
        };
        let Some((class, action)) = preferred_class(train, criteria) else {
            continue;
        };

        debug!(row = train.row, departure = %train.departure, delta_minutes = delta, class = %class, "Eligible train");

        // Strict comparison keeps the first row on ties.
        if best.as_ref().is_none_or(|b| delta < b.delta_minutes) {
            best = Some(Selection {
                train,
                class,
                action,
                delta_minutes: delta,
            });
        }
    }

    best
}

// ============================================================================
// Tests
// ============================================================================
