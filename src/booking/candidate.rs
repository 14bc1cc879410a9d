//! Trains read from one search result page.
//!
//! A [`CandidateTrain`] lives for a single poll iteration; the next search
//! produces fresh ones.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::driver::By;
use crate::error::{Error, Result};

use super::criteria::SeatClass;

// ============================================================================
// ClockTime
// ============================================================================

/// Time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Creates a time from hour and minute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when out of range.
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(Error::config(format!("Invalid time {hour:02}:{minute:02}")));
        }
        Ok(Self {
            minutes: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    /// Minutes since midnight.
    #[inline]
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.minutes as u32
    }
}

impl FromStr for ClockTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (hour, minute) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| Error::config(format!("Expected HH:MM, got '{s}'")))?;
        let hour = hour
            .parse()
            .map_err(|_| Error::config(format!("Bad hour in '{s}'")))?;
        let minute = minute
            .parse()
            .map_err(|_| Error::config(format!("Bad minute in '{s}'")))?;
        Self::new(hour, minute)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

// ============================================================================
// ClassAvailability
// ============================================================================

/// One seat-class cell of a result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAvailability {
    /// Class of the cell.
    pub class: SeatClass,
    /// Reserve control, present only while the class is bookable.
    pub action: Option<By>,
}

// ============================================================================
// CandidateTrain
// ============================================================================

/// One row of the results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTrain {
    /// Zero-based position in the results table.
    pub row: usize,
    /// Network code shown in the category column (`SRT`, `KTX`, ...).
    pub category: String,
    /// Train number.
    pub number: String,
    /// Departure time.
    pub departure: ClockTime,
    /// Arrival time, when readable.
    pub arrival: Option<ClockTime>,
    /// Per-class availability.
    pub classes: Vec<ClassAvailability>,
}

impl CandidateTrain {
    /// Returns the reserve control for a class if that class is bookable.
    #[must_use]
    pub fn action_for(&self, class: SeatClass) -> Option<&By> {
        self.classes
            .iter()
            .find(|c| c.class == class)
            .and_then(|c| c.action.as_ref())
    }

    /// Returns `true` if any class is bookable.
    #[must_use]
    pub fn has_availability(&self) -> bool {
        self.classes.iter().any(|c| c.action.is_some())
    }
}

impl fmt::Display for CandidateTrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.category, self.number, self.departure)?;
        if let Some(arrival) = self.arrival {
            write!(f, "→{arrival}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
