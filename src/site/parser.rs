//! Page parsing adapter.
//!
//! The poller never looks at markup directly. It hands page sources to a
//! [`PageParser`] and gets back candidates, markers and receipts. One
//! implementation exists per site layout; [`SrtParser`] reads the current
//! SRT results table.
//!
//! # Results table layout
//!
//! | Column | Content |
//! |--------|---------|
//! | `td[1]` | network code (`SRT`) on the first line |
//! | `td[2]` | train number |
//! | `td[3]` | departure station and `HH:MM` |
//! | `td[4]` | arrival station and `HH:MM` |
//! | `td[5]` | premium class cell |
//! | `td[6]` | standard class cell |
//!
//! Column indices are 0-based. A class cell offers a "reserve" link and,
//! separately, a "choose seat" link; only the former claims the seat.

// ============================================================================
// Imports
// ============================================================================

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::booking::{CandidateTrain, ClassAvailability, ClockTime, Receipt, SeatClass};
use crate::driver::By;
use crate::error::{Error, Result};

use super::pages::{COMPLETION_MARKERS, LOST_RACE_MARKERS, SOLD_OUT_MARKER};

// ============================================================================
// Constants
// ============================================================================

/// Fewest cells a row needs to carry both class columns.
const MIN_CELLS: usize = 7;

const CATEGORY_CELL: usize = 1;
const NUMBER_CELL: usize = 2;
const DEPARTURE_CELL: usize = 3;
const ARRIVAL_CELL: usize = 4;

/// Class columns in the order they appear.
const CLASS_CELLS: [(usize, SeatClass); 2] = [(5, SeatClass::Premium), (6, SeatClass::Standard)];

// ============================================================================
// PageParser
// ============================================================================

/// Reads structured data out of page sources.
///
/// Implementations must be pure: the same HTML always yields the same
/// result.
pub trait PageParser: Send + Sync {
    /// Parses the results table into candidates, in table order.
    fn parse_results(&self, html: &str) -> Vec<CandidateTrain>;

    /// Returns `true` if the page says the claimed seat is gone.
    fn is_lost_race(&self, html: &str) -> bool;

    /// Returns `true` if the payment page shows a completion marker.
    fn is_payment_complete(&self, html: &str) -> bool;

    /// Reads amount and approval time from a completion page.
    fn read_receipt(&self, html: &str) -> Receipt;
}

// ============================================================================
// SrtParser
// ============================================================================

/// [`PageParser`] for the SRT site.
#[derive(Debug, Clone)]
pub struct SrtParser {
    rows: Selector,
    anchors: Selector,
    cells: Selector,
    clock: Regex,
    date: Regex,
}

impl SrtParser {
    /// Compiles the selectors and patterns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a built-in selector fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            rows: selector("tbody tr")?,
            anchors: selector("a")?,
            cells: selector("td")?,
            clock: pattern(r"(\d{1,2}):(\d{2})")?,
            date: pattern(r"20\d{2}[./-]\s?\d{1,2}[./-]\s?\d{1,2}")?,
        })
    }

    fn parse_row(&self, row: usize, tr: ElementRef<'_>) -> Option<CandidateTrain> {
        let cells: Vec<ElementRef<'_>> = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "td")
            .collect();

        if cells.len() < MIN_CELLS {
            debug!(row, cells = cells.len(), "Skipping short row");
            return None;
        }

        let category = first_line(cells[CATEGORY_CELL])?;
        let number = first_line(cells[NUMBER_CELL]).unwrap_or_default();
        let Some(departure) = self.clock_in(cells[DEPARTURE_CELL]) else {
            debug!(row, "Skipping row without departure time");
            return None;
        };
        let arrival = self.clock_in(cells[ARRIVAL_CELL]);

        let classes = CLASS_CELLS
            .iter()
            .map(|&(column, class)| ClassAvailability {
                class,
                action: self.reserve_action(row, column, cells[column]),
            })
            .collect();

        Some(CandidateTrain {
            row,
            category,
            number,
            departure,
            arrival,
            classes,
        })
    }

    fn clock_in(&self, cell: ElementRef<'_>) -> Option<ClockTime> {
        let text = cell.text().collect::<String>();
        let caps = self.clock.captures(&text)?;
        let hour = caps[1].parse().ok()?;
        let minute = caps[2].parse().ok()?;
        ClockTime::new(hour, minute).ok()
    }

    /// Locator of the cell's reserve link, or `None` if sold out.
    fn reserve_action(&self, row: usize, column: usize, cell: ElementRef<'_>) -> Option<By> {
        if cell.text().any(|t| t.contains(SOLD_OUT_MARKER)) {
            return None;
        }

        cell.select(&self.anchors)
            .position(|a| is_reserve_label(&a.text().collect::<String>()))
            .map(|index| {
                By::xpath(format!(
                    "((//tbody/tr)[{}]/td[{}]//a)[{}]",
                    row + 1,
                    column + 1,
                    index + 1
                ))
            })
    }
}

impl PageParser for SrtParser {
    fn parse_results(&self, html: &str) -> Vec<CandidateTrain> {
        let document = Html::parse_document(html);
        let candidates: Vec<CandidateTrain> = document
            .select(&self.rows)
            .enumerate()
            .filter_map(|(row, tr)| self.parse_row(row, tr))
            .collect();

        debug!(count = candidates.len(), "Parsed results table");
        candidates
    }

    fn is_lost_race(&self, html: &str) -> bool {
        LOST_RACE_MARKERS.iter().any(|m| html.contains(m))
    }

    fn is_payment_complete(&self, html: &str) -> bool {
        COMPLETION_MARKERS.iter().any(|m| html.contains(m))
    }

    fn read_receipt(&self, html: &str) -> Receipt {
        let document = Html::parse_document(html);
        let texts: Vec<String> = document
            .select(&self.cells)
            .map(|td| collapse(&td.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .collect();

        Receipt {
            amount: texts
                .iter()
                .find(|t| t.contains('원') && t.chars().any(|c| c.is_ascii_digit()))
                .cloned(),
            approved_at: texts.iter().find(|t| self.date.is_match(t)).cloned(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::config(format!("Bad selector '{css}': {e}")))
}

fn pattern(re: &str) -> Result<Regex> {
    Regex::new(re).map_err(|e| Error::config(format!("Bad pattern '{re}': {e}")))
}

/// A reserve link reads "예약하기" (sometimes "예약 하기"); seat-choice
/// links also mention 좌석 and must not match.
fn is_reserve_label(text: &str) -> bool {
    text.contains("예약") && text.contains("하기") && !text.contains("좌석")
}

/// First non-blank text line of an element.
fn first_line(cell: ElementRef<'_>) -> Option<String> {
    cell.text()
        .flat_map(str::lines)
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Tests
// ============================================================================
