//! Run configuration.
//!
//! One JSON file describes a run. It is loaded and validated up front; the
//! hunter itself trusts what it is given.
//!
//! # Example
//!
//! ```json
//! {
//!   "credentials": { "member_id": "1234567890", "password": "secret" },
//!   "search": {
//!     "departure": "수서",
//!     "arrival": "부산",
//!     "date": "2026-10-20",
//!     "target_hour": 8,
//!     "tolerance_minutes": 30,
//!     "seat_classes": ["standard"],
//!     "passengers": 2,
//!     "companions": ["김철수"]
//!   },
//!   "payment": { "phone": "01012345678", "birth_date": "900101" },
//!   "settings": { "refresh_interval": 0.05 },
//!   "browser": { "kind": "chrome", "headless": false }
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::booking::SearchCriteria;
use crate::driver::{BrowserKind, WebDriverBuilder};
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default pause between searches, in seconds.
pub const DEFAULT_REFRESH_INTERVAL: f64 = 0.05;

/// Default network code of bookable trains.
pub const DEFAULT_NETWORK: &str = "SRT";

const PHONE_DIGITS: usize = 11;
const BIRTH_DATE_DIGITS: usize = 6;

// ============================================================================
// Credentials
// ============================================================================

/// Site login.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    /// Member number (or registered e-mail / phone).
    pub member_id: String,
    /// Password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("member_id", &self.member_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// PaymentContact
// ============================================================================

/// Details typed into the payment provider's window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentContact {
    /// Mobile number, 11 digits, no separators.
    pub phone: String,
    /// Birth date as `YYMMDD`.
    pub birth_date: String,
}

impl PaymentContact {
    /// Checks digit counts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either field has the wrong shape.
    pub fn validate(&self) -> Result<()> {
        if !is_digits(&self.phone, PHONE_DIGITS) {
            return Err(Error::config(format!(
                "Phone number must be exactly {PHONE_DIGITS} digits"
            )));
        }
        if !is_digits(&self.birth_date, BIRTH_DATE_DIGITS) {
            return Err(Error::config(format!(
                "Birth date must be exactly {BIRTH_DATE_DIGITS} digits (YYMMDD)"
            )));
        }
        Ok(())
    }
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

// ============================================================================
// Settings
// ============================================================================

/// Poll loop settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pause between searches, in seconds.
    pub refresh_interval: f64,
    /// Network code a train must carry to be eligible.
    pub network: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            network: DEFAULT_NETWORK.to_string(),
        }
    }
}

impl Settings {
    /// Pause between searches.
    #[must_use]
    pub fn refresh(&self) -> Duration {
        Duration::try_from_secs_f64(self.refresh_interval)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_REFRESH_INTERVAL))
    }

    /// Checks the refresh interval and network code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a non-positive or non-finite interval,
    /// or an empty network code.
    pub fn validate(&self) -> Result<()> {
        if !self.refresh_interval.is_finite() || self.refresh_interval <= 0.0 {
            return Err(Error::config(format!(
                "Refresh interval must be a positive number of seconds, got {}",
                self.refresh_interval
            )));
        }
        if self.network.trim().is_empty() {
            return Err(Error::config("Network code cannot be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Timings
// ============================================================================

/// Wait budgets for page interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Login redirect to the main page.
    pub login: Duration,
    /// Form controls and the search button.
    pub element: Duration,
    /// Results table render after a search.
    pub results_settle: Duration,
    /// Claim to confirmation page.
    pub confirm: Duration,
    /// Settle on the confirmation page before reading it.
    pub confirm_settle: Duration,
    /// Each checkout control.
    pub checkout_control: Duration,
    /// Provider window to appear after the final submit.
    pub payment_window: Duration,
    /// Provider window to finish loading.
    pub payment_settle: Duration,
    /// Completion wait after which messaging changes.
    pub soft_deadline: Duration,
    /// Interval between completion checks.
    pub completion_poll: Duration,
    /// Pause after typing into a field.
    pub field_settle: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            login: Duration::from_secs(10),
            element: Duration::from_secs(10),
            results_settle: Duration::from_secs(1),
            confirm: Duration::from_secs(30),
            confirm_settle: Duration::from_secs(1),
            checkout_control: Duration::from_secs(5),
            payment_window: Duration::from_secs(5),
            payment_settle: Duration::from_secs(2),
            soft_deadline: Duration::from_secs(600),
            completion_poll: Duration::from_secs(1),
            field_settle: Duration::from_millis(300),
        }
    }
}

// ============================================================================
// BrowserConfig
// ============================================================================

/// Browser session settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Engine.
    pub kind: BrowserKind,
    /// WebDriver server; defaults to the engine's local port.
    pub server_url: Option<String>,
    /// Run without a window.
    pub headless: bool,
    /// Window size `[width, height]`.
    pub window_size: Option<(u32, u32)>,
    /// Extra browser arguments.
    pub args: Vec<String>,
}

impl BrowserConfig {
    /// Builder for a session with these settings.
    #[must_use]
    pub fn builder(&self) -> WebDriverBuilder {
        let mut builder = WebDriverBuilder::new()
            .kind(self.kind)
            .headless(self.headless)
            .args(self.args.iter().cloned());
        if let Some(url) = &self.server_url {
            builder = builder.server_url(url.clone());
        }
        if let Some((width, height)) = self.window_size {
            builder = builder.window_size(width, height);
        }
        builder
    }
}

// ============================================================================
// Config
// ============================================================================

/// Everything one run needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Site login.
    pub credentials: Credentials,
    /// What to book.
    pub search: SearchCriteria,
    /// Payment window details.
    pub payment: PaymentContact,
    /// Poll loop settings.
    #[serde(default)]
    pub settings: Settings,
    /// Browser session.
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Wait budgets; not read from the file.
    #[serde(skip)]
    pub timings: Timings,
}

impl Config {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be read
    /// - [`Error::Json`] if it is not valid configuration JSON
    /// - [`Error::Config`] if a value is out of range
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration");

        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parses and validates configuration JSON.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.credentials.member_id.trim().is_empty() {
            return Err(Error::config("Member id is required"));
        }
        if self.credentials.password.is_empty() {
            return Err(Error::config("Password is required"));
        }
        self.search.validate()?;
        self.payment.validate()?;
        self.settings.validate()?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::booking::SeatClass;

    const SAMPLE: &str = r#"{
        "credentials": { "member_id": "1234567890", "password": "hunter2" },
        "search": {
            "departure": "수서",
            "arrival": "부산",
            "date": "2026-10-20",
            "target_hour": 8,
            "tolerance_minutes": 20,
            "seat_classes": ["premium", "standard"],
            "passengers": 2,
            "companions": ["김철수"]
        },
        "payment": { "phone": "01012345678", "birth_date": "900101" },
        "settings": { "refresh_interval": 0.5 },
        "browser": { "kind": "firefox", "headless": true, "window_size": [1280, 900] }
    }"#;

    fn with(patch: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        patch(&mut value);
        value.to_string()
    }

    #[test]
    fn test_parse_sample() {
        let config = Config::from_json(SAMPLE).unwrap();

        assert_eq!(config.search.date.label(), "2026/10/20(화)");
        assert!(config.search.accepts(SeatClass::Premium));
        assert_eq!(config.search.companion_names(), vec!["김철수"]);
        assert_eq!(config.settings.refresh(), Duration::from_millis(500));
        assert_eq!(config.settings.network, "SRT");
        assert_eq!(config.browser.kind, BrowserKind::Firefox);
        assert_eq!(config.browser.window_size, Some((1280, 900)));
        assert_eq!(config.timings, Timings::default());
    }

    #[test]
    fn test_settings_default() {
        let json = with(|v| {
            v.as_object_mut().unwrap().remove("settings");
        });
        let config = Config::from_json(&json).unwrap();
        assert_eq!(config.settings.refresh_interval, DEFAULT_REFRESH_INTERVAL);
        assert_eq!(config.settings.refresh(), Duration::from_millis(50));
    }

    #[test]
    fn test_rejects_short_phone() {
        let json = with(|v| v["payment"]["phone"] = "0101234567".into());
        let err = Config::from_json(&json).unwrap_err();
        assert!(err.is_fatal_config());
    }

    #[test]
    fn test_rejects_non_digit_birth_date() {
        let json = with(|v| v["payment"]["birth_date"] = "90-01-01".into());
        assert!(Config::from_json(&json).unwrap_err().is_fatal_config());
    }

    #[test]
    fn test_rejects_zero_refresh() {
        let json = with(|v| v["settings"]["refresh_interval"] = 0.0.into());
        assert!(Config::from_json(&json).unwrap_err().is_fatal_config());
    }

    #[test]
    fn test_rejects_negative_refresh() {
        let json = with(|v| v["settings"]["refresh_interval"] = (-1.0).into());
        assert!(Config::from_json(&json).is_err());
    }

    #[test]
    fn test_rejects_odd_hour() {
        let json = with(|v| v["search"]["target_hour"] = 9.into());
        assert!(matches!(Config::from_json(&json), Err(Error::Json(_))));
    }

    #[test]
    fn test_rejects_missing_password() {
        let json = with(|v| v["credentials"]["password"] = "".into());
        assert!(Config::from_json(&json).unwrap_err().is_fatal_config());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let config = Config::from_json(SAMPLE).unwrap();
        let debug = format!("{:?}", config.credentials);
        assert!(debug.contains("1234567890"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/srt-hunter.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
