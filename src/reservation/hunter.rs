//! Availability poller.
//!
//! [`Hunter::run`] loops search → parse → select → claim until a ticket is
//! purchased, the caller stops it, or the browser connection breaks.
//!
//! # Failure handling
//!
//! | Failure | Effect |
//! |---------|--------|
//! | No eligible train | refresh delay, search again |
//! | Lost race | back to results, refresh delay, search again |
//! | Step-local (element missing, timeout) | logged, refresh delay, search again |
//! | Configuration and anything else | run ends with the error |
//! | Transport | run ends with the error |
//! | Stop signal | run ends with [`Error::Cancelled`] |

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::booking::{Receipt, SearchCriteria, Selection, select};
use crate::config::{PaymentContact, Settings, Timings};
use crate::control::{Progress, StopSignal};
use crate::driver::{By, Condition, Driver};
use crate::error::{Error, Result};
use crate::site::PageParser;
use crate::site::pages::{self, schedule};

use super::state::{AttemptOutcome, ReservationAttempt, Stage};

// ============================================================================
// Hunter
// ============================================================================

/// Availability poller and reservation driver.
///
/// Expects the search form to be filled in already.
pub struct Hunter<'a> {
    pub(super) driver: &'a dyn Driver,
    pub(super) parser: &'a dyn PageParser,
    pub(super) criteria: &'a SearchCriteria,
    pub(super) contact: &'a PaymentContact,
    pub(super) settings: &'a Settings,
    pub(super) timings: &'a Timings,
    pub(super) progress: &'a Progress,
    pub(super) stop: &'a StopSignal,
    /// Most recent claim; a new claim replaces it.
    last_attempt: Mutex<Option<ReservationAttempt>>,
}

impl<'a> Hunter<'a> {
    /// Creates a hunter.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        driver: &'a dyn Driver,
        parser: &'a dyn PageParser,
        criteria: &'a SearchCriteria,
        contact: &'a PaymentContact,
        settings: &'a Settings,
        timings: &'a Timings,
        progress: &'a Progress,
        stop: &'a StopSignal,
    ) -> Self {
        Self {
            driver,
            parser,
            criteria,
            contact,
            settings,
            timings,
            progress,
            stop,
            last_attempt: Mutex::new(None),
        }
    }

    /// The most recent claim, if any seat was claimed yet.
    #[must_use]
    pub fn last_attempt(&self) -> Option<ReservationAttempt> {
        self.last_attempt.lock().clone()
    }

    /// Polls until a ticket is purchased.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] once the stop signal is seen
    /// - transport errors, which are never retried
    pub async fn run(&self) -> Result<Receipt> {
        let refresh = self.settings.refresh();
        let mut iteration: u64 = 0;

        loop {
            if self.stop.is_stopped() {
                self.progress.emit("Stopped by user.");
                return Err(Error::Cancelled);
            }

            iteration += 1;
            debug!(iteration, "Search iteration");

            match self.iterate().await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                Err(e) if e.is_transport() => {
                    warn!(error = %e, "Browser connection lost");
                    self.progress
                        .emit(format!("Browser connection lost: {e}"));
                    return Err(e);
                }
                Err(Error::Cancelled) => {
                    self.progress.emit("Stopped by user.");
                    return Err(Error::Cancelled);
                }
                Err(e) if e.is_step_local() => {
                    warn!(iteration, error = %e, "Search iteration failed");
                    self.progress
                        .emit(format!("Error while searching: {e}"));
                }
                Err(e) => {
                    error!(iteration, error = %e, "Unrecoverable error while searching");
                    return Err(e);
                }
            }

            sleep(refresh).await;
        }
    }

    /// One search, and a claim if something matches.
    async fn iterate(&self) -> Result<Option<Receipt>> {
        self.progress.emit("Searching...");
        self.driver
            .click_when_ready(&schedule::search(), self.timings.element)
            .await?;
        sleep(self.timings.results_settle).await;

        let html = self.driver.page_source().await?;
        let candidates = self.parser.parse_results(&html);

        let Some(selection) = select(&candidates, self.criteria, &self.settings.network) else {
            self.progress.emit("No matching seat yet. Retrying shortly...");
            return Ok(None);
        };

        self.announce(&selection);
        let mut attempt = ReservationAttempt::new(selection.train.clone(), selection.class);
        let result = self.claim(&mut attempt, selection.action).await;

        if let Err(e) = &result {
            if e.is_transport() || matches!(e, Error::Cancelled) {
                attempt.abort();
            } else {
                attempt.conclude(AttemptOutcome::Abandoned(e.to_string()));
            }
        }
        *self.last_attempt.lock() = Some(attempt);

        match result? {
            AttemptOutcome::Purchased(receipt) => Ok(Some(receipt)),
            AttemptOutcome::LostRace | AttemptOutcome::Abandoned(_) => Ok(None),
        }
    }

    fn announce(&self, selection: &Selection<'_>) {
        let train = selection.train;
        info!(
            row = train.row,
            number = %train.number,
            departure = %train.departure,
            class = %selection.class,
            delta_minutes = selection.delta_minutes,
            "Seat found"
        );

        self.progress.emit("Found a bookable train!");
        match train.arrival {
            Some(arrival) => self.progress.emit(format!(
                "Departure {} → arrival {} (train {})",
                train.departure, arrival, train.number
            )),
            None => self.progress.emit(format!(
                "Departure {} (train {})",
                train.departure, train.number
            )),
        }
        self.progress
            .emit(format!("Class: {}, row {}", selection.class, train.row + 1));
    }

    /// Clicks reserve and checks whether the seat is really ours.
    async fn claim(&self, attempt: &mut ReservationAttempt, action: &By) -> Result<AttemptOutcome> {
        self.driver.click(action).await?;
        self.progress.emit("Reserve clicked");

        // Coupled-trainset notice.
        if self.driver.accept_next_dialog().await? {
            debug!("Accepted post-claim notice");
        }

        self.driver
            .wait_for(
                &Condition::UrlContains(pages::CONFIRM_URL_FRAGMENT.to_string()),
                self.timings.confirm,
            )
            .await?;
        self.progress.emit("Reservation confirmation page loaded");
        sleep(self.timings.confirm_settle).await;

        let html = self.driver.page_source().await?;
        if self.parser.is_lost_race(&html) {
            return self.lost_race(attempt).await;
        }

        attempt.advance(Stage::PaymentSetup);
        self.progress.emit("Seat held. Proceeding to payment...");

        if let Some(outcome) = self.checkout(attempt).await? {
            return Ok(outcome);
        }

        let receipt = self.pay().await?;
        let outcome = AttemptOutcome::Purchased(receipt);
        attempt.conclude(outcome.clone());
        Ok(outcome)
    }

    /// Another buyer was faster; go back to the results.
    pub(super) async fn lost_race(&self, attempt: &mut ReservationAttempt) -> Result<AttemptOutcome> {
        info!(train = %attempt.train(), "Lost race");
        self.progress
            .emit("Another user booked the seat first. Searching again.");
        self.tolerate("Going back", self.driver.back().await)?;
        attempt.conclude(AttemptOutcome::LostRace);
        Ok(AttemptOutcome::LostRace)
    }

    /// Drops the claim after a required checkout control went missing.
    pub(super) async fn abandon(
        &self,
        attempt: &mut ReservationAttempt,
        reason: String,
    ) -> Result<AttemptOutcome> {
        warn!(train = %attempt.train(), reason = %reason, "Abandoning claim");
        self.progress
            .emit(format!("{reason}. Back to searching."));
        self.tolerate("Going back", self.driver.back().await)?;
        let outcome = AttemptOutcome::Abandoned(reason);
        attempt.conclude(outcome.clone());
        Ok(outcome)
    }

    /// Logs a failed optional step and carries on.
    ///
    /// Transport errors and cancellation are passed through; they always
    /// end the run.
    pub(super) fn tolerate(&self, step: &str, result: Result<()>) -> Result<bool> {
        match result {
            Ok(()) => Ok(true),
            Err(e) if e.is_transport() || matches!(e, Error::Cancelled) => Err(e),
            Err(e) => {
                warn!(step, error = %e, "Step failed");
                self.progress.emit(format!("{step} failed: {e}"));
                Ok(false)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
