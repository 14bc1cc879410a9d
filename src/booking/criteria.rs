//! Search criteria for one run.
//!
//! [`SearchCriteria`] is built once from configuration and never changes
//! while the hunter polls.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::Deserialize;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Largest party the site books in one reservation.
pub const MAX_PASSENGERS: u8 = 9;

/// Korean weekday suffixes, Monday first.
const WEEKDAYS: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];

// ============================================================================
// SeatClass
// ============================================================================

/// Car class. Declaration order is claim preference: premium first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatClass {
    /// 특실.
    #[serde(alias = "특실", alias = "special")]
    Premium,
    /// 일반실.
    #[serde(alias = "일반실", alias = "general")]
    Standard,
}

impl SeatClass {
    /// All classes in preference order.
    pub const PREFERENCE: [SeatClass; 2] = [SeatClass::Premium, SeatClass::Standard];

    /// Label the site uses for this class.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Premium => "특실",
            Self::Standard => "일반실",
        }
    }
}

impl fmt::Display for SeatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// TargetHour
// ============================================================================

/// Departure hour picked in the search form (00, 02, ..., 22).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "u8")]
pub struct TargetHour(u8);

impl TargetHour {
    /// Validates an hour on the two-hour grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for odd hours or hours past 22.
    pub fn new(hour: u8) -> Result<Self> {
        if hour > 22 || hour % 2 != 0 {
            return Err(Error::config(format!(
                "Target hour must be one of 00, 02, ..., 22, got {hour:02}"
            )));
        }
        Ok(Self(hour))
    }

    /// Every selectable hour, earliest first.
    #[must_use]
    pub fn grid() -> Vec<Self> {
        (0..=22).step_by(2).map(Self).collect()
    }

    /// Returns the hour.
    #[inline]
    #[must_use]
    pub const fn hour(self) -> u8 {
        self.0
    }

    /// Minutes from midnight to `HH:00`.
    #[inline]
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0 as u32 * 60
    }

    /// Value of the matching `<option>` in the hour dropdown.
    #[must_use]
    pub fn option_value(self) -> String {
        format!("{:02}0000", self.0)
    }
}

impl TryFrom<u8> for TargetHour {
    type Error = Error;

    fn try_from(hour: u8) -> Result<Self> {
        Self::new(hour)
    }
}

impl fmt::Display for TargetHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

// ============================================================================
// TravelDate
// ============================================================================

/// Travel date, held as the label of the site's date dropdown
/// (`2026/10/20(화)`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub struct TravelDate {
    label: String,
}

impl TravelDate {
    /// Builds the dropdown label for a calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        let weekday = WEEKDAYS[date.weekday().num_days_from_monday() as usize];
        Self {
            label: format!("{}({weekday})", date.format("%Y/%m/%d")),
        }
    }

    /// Builds the label for an ISO `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `iso` is not a valid date.
    pub fn from_iso(iso: &str) -> Result<Self> {
        NaiveDate::parse_from_str(iso.trim(), "%Y-%m-%d")
            .map(Self::from_date)
            .map_err(|e| Error::config(format!("Invalid date '{iso}': {e}")))
    }

    /// Parses `YYYY-MM-DD`, or keeps any other text as a raw label.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::from_iso(text).unwrap_or_else(|_| Self {
            label: text.trim().to_string(),
        })
    }

    /// Labels for `days` consecutive days starting at `today`.
    #[must_use]
    pub fn upcoming(today: NaiveDate, days: u32) -> Vec<Self> {
        (0..u64::from(days))
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .map(Self::from_date)
            .collect()
    }

    /// Returns the dropdown label.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl From<String> for TravelDate {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl fmt::Display for TravelDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

// ============================================================================
// SearchCriteria
// ============================================================================

/// What to look for, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchCriteria {
    /// Departure station, as typed into the form.
    pub departure: String,
    /// Arrival station, as typed into the form.
    pub arrival: String,
    /// Travel date.
    pub date: TravelDate,
    /// Hour picked in the form; also the start of the eligibility window.
    pub target_hour: TargetHour,
    /// Minutes after `target_hour:00` still acceptable.
    #[serde(default = "default_tolerance")]
    pub tolerance_minutes: u32,
    /// Acceptable classes; never empty.
    pub seat_classes: BTreeSet<SeatClass>,
    /// Party size including the member.
    #[serde(default = "default_passengers")]
    pub passengers: u8,
    /// Companion names as supplied; may be shorter than `passengers - 1`.
    #[serde(default)]
    pub companions: Vec<String>,
}

fn default_tolerance() -> u32 {
    30
}

fn default_passengers() -> u8 {
    1
}

impl SearchCriteria {
    /// Checks the invariants the poller relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.departure.trim().is_empty() || self.arrival.trim().is_empty() {
            return Err(Error::config("Departure and arrival stations are required"));
        }
        if self.departure.trim() == self.arrival.trim() {
            return Err(Error::config("Departure and arrival stations are the same"));
        }
        if self.date.label().is_empty() {
            return Err(Error::config("Travel date is required"));
        }
        if self.seat_classes.is_empty() {
            return Err(Error::config("Select at least one seat class"));
        }
        if self.passengers == 0 || self.passengers > MAX_PASSENGERS {
            return Err(Error::config(format!(
                "Passenger count must be 1..={MAX_PASSENGERS}, got {}",
                self.passengers
            )));
        }
        if self.companions.len() > self.companion_slots() {
            return Err(Error::config(format!(
                "{} companion names given for {} companion seats",
                self.companions.len(),
                self.companion_slots()
            )));
        }
        Ok(())
    }

    /// Returns `true` if the class was requested.
    #[inline]
    #[must_use]
    pub fn accepts(&self, class: SeatClass) -> bool {
        self.seat_classes.contains(&class)
    }

    /// Number of companion name fields on the checkout page.
    #[inline]
    #[must_use]
    pub fn companion_slots(&self) -> usize {
        usize::from(self.passengers.saturating_sub(1))
    }

    /// Companion names for every slot, blanks replaced by placeholders.
    ///
    /// Placeholders are numbered by slot, so no two coincide.
    #[must_use]
    pub fn companion_names(&self) -> Vec<String> {
        (0..self.companion_slots())
            .map(|index| {
                self.companions
                    .get(index)
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty())
                    .map_or_else(|| companion_placeholder(index), str::to_string)
            })
            .collect()
    }
}

/// Placeholder name for an unnamed companion slot.
#[must_use]
pub fn companion_placeholder(index: usize) -> String {
    format!("동반자{}", index + 1)
}

// ============================================================================
// Tests
// ============================================================================
