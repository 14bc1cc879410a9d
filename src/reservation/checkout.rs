//! Checkout on the reservation confirmation page.
//!
//! Runs while the attempt is in [`Stage::PaymentSetup`]. Required controls
//! (companion names, payment button, ticket option, final submit) drop
//! the claim when missing; the payment-method choice is best-effort.
//! Once the final submit is clicked nothing here drops the claim.

// ============================================================================
// Imports
// ============================================================================

use tokio::time::sleep;
use tracing::debug;

use crate::driver::{Condition, Driver};
use crate::error::{Error, Result};
use crate::site::pages::checkout;

use super::hunter::Hunter;
use super::state::{AttemptOutcome, ReservationAttempt, Stage};

// ============================================================================
// Checkout
// ============================================================================

impl Hunter<'_> {
    /// Fills checkout and submits payment.
    ///
    /// Returns `Some(outcome)` if the claim ended here, `None` once the
    /// payment was submitted and the attempt is in
    /// [`Stage::PaymentExternal`].
    pub(super) async fn checkout(
        &self,
        attempt: &mut ReservationAttempt,
    ) -> Result<Option<AttemptOutcome>> {
        if let Some(outcome) = self.fill_companions(attempt).await? {
            return Ok(Some(outcome));
        }

        let payment = checkout::payment();
        let opened = async {
            self.driver
                .wait_for(&Condition::Visible(payment.clone()), self.timings.checkout_control)
                .await?;
            self.driver.click(&payment).await
        }
        .await;
        if let Some(e) = step_failed(opened)? {
            debug!(error = %e, "Payment button unavailable");
            let html = self.driver.page_source().await?;
            if self.parser.is_lost_race(&html) {
                return self.lost_race(attempt).await.map(Some);
            }
            return self
                .abandon(attempt, "Payment button not found".to_string())
                .await
                .map(Some);
        }
        self.progress.emit("Payment button clicked");

        self.select_payment_method().await?;

        let ticket = self
            .driver
            .click_when_ready(&checkout::smart_ticket(), self.timings.checkout_control)
            .await;
        if let Some(e) = step_failed(ticket)? {
            return self
                .abandon(attempt, format!("Smartphone ticket option not found ({e})"))
                .await
                .map(Some);
        }
        self.progress.emit("Smartphone ticket selected");

        sleep(self.timings.confirm_settle).await;
        if self.driver.accept_next_dialog().await? {
            debug!("Accepted ticketing notice");
        }

        let submit = self
            .driver
            .click_when_ready(&checkout::submit(), self.timings.checkout_control)
            .await;
        if let Some(e) = step_failed(submit)? {
            return self
                .abandon(attempt, format!("Final payment button not found ({e})"))
                .await
                .map(Some);
        }

        attempt.advance(Stage::PaymentExternal);
        self.progress.emit("Payment submitted");

        // Submit may raise a confirm; it blocks every later command.
        sleep(self.timings.field_settle).await;
        let notice = self.driver.accept_next_dialog().await.map(|accepted| {
            if accepted {
                debug!("Accepted payment notice");
            }
        });
        self.tolerate("Accepting the payment notice", notice)?;
        Ok(None)
    }

    /// Types a name into every companion slot, placeholders for blanks.
    async fn fill_companions(
        &self,
        attempt: &mut ReservationAttempt,
    ) -> Result<Option<AttemptOutcome>> {
        let names = self.criteria.companion_names();

        for (index, name) in names.iter().enumerate() {
            let filled = self
                .driver
                .fill_when_ready(
                    &checkout::companion_name(index),
                    name,
                    self.timings.checkout_control,
                )
                .await;
            if let Some(e) = step_failed(filled)? {
                return self
                    .abandon(
                        attempt,
                        format!("Companion name field {} not found ({e})", index + 1),
                    )
                    .await
                    .map(Some);
            }
        }

        if !names.is_empty() {
            self.progress
                .emit(format!("Companions entered: {}", names.join(", ")));
        }
        Ok(None)
    }

    /// Easy payment tab, then KakaoPay. Failures are logged only.
    async fn select_payment_method(&self) -> Result<()> {
        sleep(self.timings.confirm_settle).await;

        let tab = self
            .driver
            .click_when_ready(&checkout::easy_pay_tab(), self.timings.checkout_control)
            .await;
        if self.tolerate("Selecting easy payment", tab)? {
            self.progress.emit("Easy payment tab selected");
        }

        sleep(self.timings.confirm_settle).await;

        let kakao = self
            .driver
            .click_when_ready(&checkout::kakao_pay(), self.timings.checkout_control)
            .await;
        if self.tolerate("Selecting KakaoPay", kakao)? {
            self.progress.emit("KakaoPay selected");
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Passes transport errors through and hands back any other failure.
fn step_failed(result: Result<()>) -> Result<Option<Error>> {
    match result {
        Ok(()) => Ok(None),
        Err(e) if e.is_transport() => Err(e),
        Err(e) => Ok(Some(e)),
    }
}

// ============================================================================
// Tests
// ============================================================================
