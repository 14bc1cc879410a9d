//! One booking run, start to finish.
//!
//! ```text
//! connect ─▶ authenticate ─▶ prepare form ─▶ hunt ─▶ teardown
//! ```
//!
//! Every failure is caught here and turned into a [`RunOutcome`]; the
//! browser is released afterwards whatever happened.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, error, info};

use crate::booking::Receipt;
use crate::config::Config;
use crate::control::{Progress, StopSignal};
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::reservation::Hunter;
use crate::session::SessionController;
use crate::site::PageParser;

// ============================================================================
// RunOutcome
// ============================================================================

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// `true` if a ticket was purchased.
    pub success: bool,
    /// Last progress message, which explains the result.
    pub reason: String,
    /// Receipt of a successful purchase.
    pub receipt: Option<Receipt>,
}

// ============================================================================
// Entry points
// ============================================================================

/// Connects a browser as configured, then runs.
pub async fn run_with_browser(
    config: &Config,
    parser: &dyn PageParser,
    progress: &Progress,
    stop: &StopSignal,
) -> RunOutcome {
    progress.emit("Starting browser...");
    match config.browser.builder().connect().await {
        Ok(session) => run(&session, config, parser, progress, stop).await,
        Err(e) => {
            error!(error = %e, "Could not start browser");
            progress.emit(format!("Could not start browser: {e}"));
            outcome(progress, None)
        }
    }
}

/// Runs login, form preparation and the hunt on an open session.
///
/// The session is closed before returning.
pub async fn run(
    driver: &dyn Driver,
    config: &Config,
    parser: &dyn PageParser,
    progress: &Progress,
    stop: &StopSignal,
) -> RunOutcome {
    let result = pipeline(driver, config, parser, progress, stop).await;

    let receipt = match result {
        Ok(receipt) => {
            info!(receipt = %receipt, "Run succeeded");
            Some(receipt)
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            match e {
                // Already narrated where they happened.
                Error::Cancelled | Error::InvalidCredentials { .. } => {}
                _ if e.is_transport() => {}
                e if e.is_fatal_config() => progress.emit(format!("Configuration problem: {e}")),
                e => progress.emit(format!("Booking failed: {e}")),
            }
            None
        }
    };

    teardown(driver).await;
    outcome(progress, receipt)
}

async fn pipeline(
    driver: &dyn Driver,
    config: &Config,
    parser: &dyn PageParser,
    progress: &Progress,
    stop: &StopSignal,
) -> Result<Receipt> {
    let session = SessionController::new(driver, &config.timings, progress);

    session.authenticate(&config.credentials).await?;
    if stop.is_stopped() {
        progress.emit("Stopped by user.");
        return Err(Error::Cancelled);
    }

    session.prepare_search_form(&config.search).await?;
    progress.emit("Search form ready. Hunting for seats...");

    Hunter::new(
        driver,
        parser,
        &config.search,
        &config.payment,
        &config.settings,
        &config.timings,
        progress,
        stop,
    )
    .run()
    .await
}

/// Closes the page, then the session. Errors are logged and dropped.
async fn teardown(driver: &dyn Driver) {
    if let Err(e) = driver.close_page().await {
        debug!(error = %e, "Closing page during teardown failed");
    }
    if let Err(e) = driver.quit().await {
        debug!(error = %e, "Ending session during teardown failed");
    }
}

fn outcome(progress: &Progress, receipt: Option<Receipt>) -> RunOutcome {
    RunOutcome {
        success: receipt.is_some(),
        reason: progress.last().unwrap_or_default(),
        receipt,
    }
}

// ============================================================================
// Tests
// ============================================================================
