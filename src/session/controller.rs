//! Login and search form preparation.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, info, warn};

use crate::booking::SearchCriteria;
use crate::config::{Credentials, Timings};
use crate::control::Progress;
use crate::driver::{Condition, Driver, SelectBy};
use crate::error::{Error, Result};
use crate::site::pages::{self, login, schedule};

// ============================================================================
// SessionController
// ============================================================================

/// Brings a fresh browser session to a filled-in search form.
///
/// Runs once per run, before polling starts. Every error it returns ends
/// the run.
pub struct SessionController<'a> {
    driver: &'a dyn Driver,
    timings: &'a Timings,
    progress: &'a Progress,
}

impl<'a> SessionController<'a> {
    /// Creates a controller over a driver.
    #[inline]
    #[must_use]
    pub fn new(driver: &'a dyn Driver, timings: &'a Timings, progress: &'a Progress) -> Self {
        Self {
            driver,
            timings,
            progress,
        }
    }

    /// Logs in and leaves exactly one page open.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCredentials`] if the main page is not reached in time
    /// - [`Error::ElementNotFound`] / [`Error::Timeout`] if the form never renders
    /// - transport errors from the driver
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        self.progress.emit("Opening login page...");
        self.driver.navigate(pages::LOGIN_URL).await?;

        self.progress.emit("Logging in...");
        self.driver
            .fill_when_ready(&login::member_id(), &credentials.member_id, self.timings.element)
            .await?;
        self.driver
            .fill(&login::password(), &credentials.password)
            .await?;
        self.driver.click(&login::submit()).await?;

        let landed = self
            .driver
            .wait_for(
                &Condition::UrlContains(pages::MAIN_URL.to_string()),
                self.timings.login,
            )
            .await;

        match landed {
            Ok(()) => {}
            Err(e) if e.is_timeout() => {
                warn!(member_id = %credentials.member_id, "Login did not reach main page");
                self.progress
                    .emit("Login failed. Check member id and password.");
                return Err(Error::invalid_credentials(
                    self.timings.login.as_millis() as u64,
                ));
            }
            Err(e) => return Err(e),
        }

        info!(member_id = %credentials.member_id, "Logged in");
        self.progress.emit("Logged in");

        self.close_extra_pages().await
    }

    /// Closes every page except the active one.
    async fn close_extra_pages(&self) -> Result<()> {
        let keep = self.driver.current_page().await?;
        let pages = self.driver.list_open_pages().await?;

        for page in pages.iter().filter(|p| **p != keep) {
            debug!(page = %page, "Closing extra page");
            self.driver.switch_to(page).await?;
            self.driver.close_page().await?;
        }

        if pages.len() > 1 {
            self.driver.switch_to(&keep).await?;
        }
        Ok(())
    }

    /// Opens the schedule page and fills the search form.
    ///
    /// Stations are typed as-is; the site resolves them. Date and hour
    /// must match an offered option exactly.
    ///
    /// # Errors
    ///
    /// - [`Error::OptionNotFound`] if the date, hour or passenger count is not offered
    /// - [`Error::ElementNotFound`] / [`Error::Timeout`] if the form never renders
    /// - transport errors from the driver
    pub async fn prepare_search_form(&self, criteria: &SearchCriteria) -> Result<()> {
        self.progress.emit("Opening schedule search...");
        self.driver.navigate(pages::SCHEDULE_URL).await?;

        self.driver
            .fill_when_ready(&schedule::departure(), &criteria.departure, self.timings.element)
            .await?;
        self.driver
            .fill(&schedule::arrival(), &criteria.arrival)
            .await?;
        self.progress.emit(format!(
            "Route: {} → {}",
            criteria.departure, criteria.arrival
        ));

        self.driver
            .select_option(
                &schedule::date(),
                &SelectBy::Label(criteria.date.label().to_string()),
            )
            .await?;
        self.progress.emit(format!("Date: {}", criteria.date));

        self.driver
            .select_option(
                &schedule::hour(),
                &SelectBy::Value(criteria.target_hour.option_value()),
            )
            .await?;
        self.progress
            .emit(format!("Departure from {}", criteria.target_hour));

        if criteria.passengers > 1 {
            self.driver
                .select_option(
                    &schedule::passengers(),
                    &SelectBy::Value(criteria.passengers.to_string()),
                )
                .await?;
            self.progress
                .emit(format!("Passengers: {}", criteria.passengers));
        }

        debug!(
            departure = %criteria.departure,
            arrival = %criteria.arrival,
            date = %criteria.date,
            hour = %criteria.target_hour,
            "Search form ready"
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
