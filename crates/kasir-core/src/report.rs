//! # Report Aggregation
//!
//! Report windows and the pure side of the reporting engine.
//!
//! ## Window Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Dates are calendar days in the server's local timezone.               │
//! │                                                                         │
//! │  range("2026-03-01", "2026-03-02")                                     │
//! │                                                                         │
//! │  ──┬──────────── 03-01 ───────────┬────────── 03-02 ──────────┬──      │
//! │    │                              │                           │        │
//! │  local 00:00 03-01 (inclusive)                  local 00:00 03-03      │
//! │                                                  (exclusive)           │
//! │                                                                         │
//! │  start > end  →  empty window, no store access                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Aggregation
//! ```text
//! headers ──► record_transaction(total)   revenue += total, count += 1
//! details ──► record_line(id, name, qty)  qty[id] += qty
//!                      │
//!                      ▼
//!             highest_selling(): max qty, first-seen product wins ties
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;
use crate::types::{ProductSold, Report};
use crate::validation::{parse_report_date, ValidationResult};

// =============================================================================
// Report Window
// =============================================================================

/// An inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    /// A window covering a single day.
    pub const fn for_day(day: NaiveDate) -> Self {
        ReportWindow { start: day, end: day }
    }

    /// Today in the server's local timezone.
    pub fn today() -> Self {
        Self::for_day(Local::now().date_naive())
    }

    /// A window from `start` through `end`, both inclusive.
    pub const fn range(start: NaiveDate, end: NaiveDate) -> Self {
        ReportWindow { start, end }
    }

    /// Parses `YYYY-MM-DD` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::report::ReportWindow;
    ///
    /// let window = ReportWindow::parse("2026-03-01", "2026-03-31").unwrap();
    /// assert!(!window.is_empty());
    /// assert!(ReportWindow::parse("2026-03-01", "March 31").is_err());
    /// ```
    pub fn parse(start: &str, end: &str) -> ValidationResult<Self> {
        let start = parse_report_date("start_date", start)?;
        let end = parse_report_date("end_date", end)?;
        Ok(Self::range(start, end))
    }

    /// A window whose start is after its end contains nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Half-open UTC instants `[from, until)` covering the window.
    ///
    /// `until` is `None` when the day after `end` falls past year 9999.
    /// Stored timestamps are RFC 3339 text, which only orders correctly
    /// for four-digit years, so such a window has no upper bound.
    pub fn bounds_utc(&self) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
        let until = self
            .end
            .succ_opt()
            .map(local_midnight_utc)
            .filter(|until| until.year() <= MAX_TEXT_YEAR);
        (local_midnight_utc(self.start), until)
    }
}

/// Largest year whose RFC 3339 text still sorts in time order.
const MAX_TEXT_YEAR: i32 = 9999;

/// Start of `day` in local time, as a UTC instant.
///
/// On a DST gap the earliest valid local instant is used; if none exists
/// midnight is read as UTC.
fn local_midnight_utc(day: NaiveDate) -> DateTime<Utc> {
    let naive: NaiveDateTime = day.and_time(chrono::NaiveTime::MIN);
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

// =============================================================================
// Sales Tally
// =============================================================================

#[derive(Debug, Clone)]
struct LineTotal {
    name: String,
    qty: i64,
}

/// Accumulates ledger rows into a [`Report`].
///
/// Products are keyed by id. The name shown is the snapshot from the
/// first line seen for that id.
///
/// ## Example
/// ```rust
/// use kasir_core::report::SalesTally;
///
/// let mut tally = SalesTally::new();
/// tally.record_transaction(4500).unwrap();
/// tally.record_line(1, "Kopi", 3);
/// tally.record_line(2, "Teh", 2);
/// tally.record_line(2, "Teh", 2);
///
/// let report = tally.into_report();
/// assert_eq!(report.total_revenue, 4500);
/// assert_eq!(report.highest_selling.name, "Teh");
/// assert_eq!(report.highest_selling.qty, 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SalesTally {
    revenue: Money,
    transactions: i64,
    lines: Vec<LineTotal>,
    index: HashMap<i64, usize>,
}

impl SalesTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one transaction header.
    pub fn record_transaction(&mut self, total_amount: i64) -> Result<(), CoreError> {
        self.revenue = self
            .revenue
            .checked_add(Money::from_minor(total_amount))
            .ok_or_else(|| CoreError::AmountOverflow {
                context: "report revenue".to_string(),
            })?;
        self.transactions += 1;
        Ok(())
    }

    /// Adds one detail line to its product's quantity.
    pub fn record_line(&mut self, product_id: i64, product_name: &str, qty: i64) {
        match self.index.get(&product_id) {
            Some(&i) => self.lines[i].qty = self.lines[i].qty.saturating_add(qty),
            None => {
                self.index.insert(product_id, self.lines.len());
                self.lines.push(LineTotal {
                    name: product_name.to_string(),
                    qty,
                });
            }
        }
    }

    pub fn revenue(&self) -> Money {
        self.revenue
    }

    pub fn transaction_count(&self) -> i64 {
        self.transactions
    }

    /// Product with the largest summed quantity.
    ///
    /// Only a strictly larger quantity displaces the current leader, so the
    /// product seen first wins a tie. Empty tally gives `("", 0)`.
    pub fn highest_selling(&self) -> ProductSold {
        let mut best: Option<&LineTotal> = None;
        for line in &self.lines {
            match best {
                Some(current) if line.qty <= current.qty => {}
                _ => best = Some(line),
            }
        }

        best.map(|line| ProductSold {
            name: line.name.clone(),
            qty: line.qty,
        })
        .unwrap_or_default()
    }

    pub fn into_report(self) -> Report {
        Report {
            total_revenue: self.revenue.minor(),
            total_transaction: self.transactions,
            highest_selling: self.highest_selling(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
