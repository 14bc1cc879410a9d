//! KakaoPay window and completion wait.
//!
//! Everything here happens after the final submit, so nothing short of a
//! broken connection or a stop request ends the attempt: every other
//! failure is logged, and the wait for completion goes on without a hard
//! limit. Going back to searching from here would buy the ticket twice.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::booking::Receipt;
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::identifiers::PageId;
use crate::site::pages::payment;

use super::hunter::Hunter;

// ============================================================================
// Constants
// ============================================================================

/// Interval between open-page checks while the provider window opens.
const PAGE_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// Payment
// ============================================================================

impl Hunter<'_> {
    /// Drives the provider window and waits for the payment to complete.
    ///
    /// # Errors
    ///
    /// Only these two; anything else is logged and waited out.
    ///
    /// - [`Error::Cancelled`] if the stop signal trips while waiting
    /// - transport errors
    pub(super) async fn pay(&self) -> Result<Receipt> {
        sleep(self.timings.payment_settle).await;

        let origin = match self.driver.current_page().await {
            Ok(page) => Some(page),
            Err(e) => {
                self.tolerate("Reading the booking page id", Err(e))?;
                None
            }
        };

        let window = match &origin {
            Some(origin) => self.find_payment_page(origin).await?,
            None => None,
        };
        let window = match window {
            Some(page) => {
                let switched = self.driver.switch_to(&page).await;
                if self.tolerate("Switching to the KakaoPay window", switched)? {
                    self.progress.emit("Switched to the KakaoPay window");
                    Some(page)
                } else {
                    self.progress.emit("Continuing on the current page.");
                    None
                }
            }
            None => {
                self.progress
                    .emit("KakaoPay window not found. Continuing on the current page.");
                None
            }
        };

        sleep(self.timings.payment_settle).await;
        self.request_payment().await?;

        let completion = self.await_completion(window.as_ref()).await?;
        let receipt = completion
            .map(|html| self.parser.read_receipt(&html))
            .unwrap_or_default();

        info!(receipt = %receipt, "Payment complete");
        self.progress.emit("Payment complete!");
        if let Some(amount) = &receipt.amount {
            self.progress.emit(format!("Amount: {amount}"));
        }
        if let Some(approved_at) = &receipt.approved_at {
            self.progress.emit(format!("Approved at: {approved_at}"));
        }

        if let (Some(page), Some(origin)) = (&window, &origin) {
            self.close_payment_page(page, origin).await?;
        }

        self.progress.emit("Booking complete.");
        Ok(receipt)
    }

    /// Newest page other than `origin`, waiting briefly for one to open.
    ///
    /// Returns `None` if none opened within the payment window budget.
    async fn find_payment_page(&self, origin: &PageId) -> Result<Option<PageId>> {
        let deadline = Instant::now() + self.timings.payment_window;

        loop {
            match self.driver.list_open_pages().await {
                Ok(pages) => {
                    debug!(open = pages.len(), "Looking for payment window");
                    if let Some(page) = pages.into_iter().rev().find(|p| p != origin) {
                        return Ok(Some(page));
                    }
                }
                Err(e) if e.is_transport() => return Err(e),
                Err(e) => debug!(error = %e, "Listing pages failed"),
            }

            if Instant::now() >= deadline {
                debug!(error = %Error::NoPaymentPage, "Giving up on payment window");
                return Ok(None);
            }
            sleep(PAGE_POLL_INTERVAL).await;
        }
    }

    /// Messenger tab, phone, birth date, request button.
    async fn request_payment(&self) -> Result<()> {
        let budget = self.timings.checkout_control;

        let tab = self
            .driver
            .click_when_ready(&payment::messenger_tab(), budget)
            .await;
        if self.tolerate("Selecting KakaoTalk payment", tab)? {
            self.progress.emit("KakaoTalk payment tab selected");
        }
        sleep(self.timings.field_settle).await;

        let phone = self
            .driver
            .fill_when_ready(&payment::phone(), &self.contact.phone, budget)
            .await;
        if self.tolerate("Entering phone number", phone)? {
            self.progress.emit("Phone number entered");
        }

        let birth = self
            .driver
            .fill_when_ready(&payment::birth_date(), &self.contact.birth_date, budget)
            .await;
        if self.tolerate("Entering birth date", birth)? {
            self.progress.emit("Birth date entered");
        }

        sleep(self.timings.field_settle).await;
        let request = self
            .driver
            .click_when_ready(&payment::request(), budget)
            .await;
        if self.tolerate("Requesting payment", request)? {
            self.progress
                .emit("Payment requested. Approve it in KakaoTalk on your phone.");
        }
        Ok(())
    }

    /// Polls for a completion marker with no hard deadline.
    ///
    /// Returns the completion page source, or `None` if the window closed
    /// itself, which the provider does once the payment went through.
    async fn await_completion(&self, window: Option<&PageId>) -> Result<Option<String>> {
        let started = Instant::now();
        let mut overdue = false;

        loop {
            if self.stop.is_stopped() {
                return Err(Error::Cancelled);
            }

            if let Some(page) = window {
                match self.driver.list_open_pages().await {
                    Ok(pages) if !pages.contains(page) => {
                        info!(page = %page, "Payment window closed");
                        return Ok(None);
                    }
                    Ok(_) => {}
                    Err(e) if e.is_transport() => return Err(e),
                    Err(e) => debug!(error = %e, "Listing pages failed"),
                }
            }

            match self.driver.page_source().await {
                Ok(html) if self.parser.is_payment_complete(&html) => return Ok(Some(html)),
                Ok(_) => {}
                Err(e) if e.is_transport() => return Err(e),
                Err(Error::PageNotFound { .. }) => return Ok(None),
                Err(e) => debug!(error = %e, "Completion check failed"),
            }

            if !overdue && started.elapsed() >= self.timings.soft_deadline {
                overdue = true;
                self.progress.emit(format!(
                    "Payment not confirmed after {} minutes. Still waiting...",
                    self.timings.soft_deadline.as_secs() / 60
                ));
            }

            sleep(self.timings.completion_poll).await;
        }
    }

    async fn close_payment_page(&self, page: &PageId, origin: &PageId) -> Result<()> {
        let still_open = match self.driver.list_open_pages().await {
            Ok(pages) => pages.contains(page),
            Err(e) => {
                self.tolerate("Listing pages", Err(e))?;
                false
            }
        };
        if still_open {
            let closed = self.driver.close_page().await;
            self.tolerate("Closing payment window", closed)?;
        }
        let back = self.driver.switch_to(origin).await;
        self.tolerate("Returning to the booking page", back)?;
        Ok(())
    }
}
