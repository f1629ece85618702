//! # fc-time
//!
//! Date, weekday, legacy packed-key, and fiscal-week record types.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `AccountingPeriod` (one fiscal week) and its classification schemes.
pub mod accounting_period;

/// `Date` type.
pub mod date;

/// `FiscalYearRange` — begin/end dates of a fiscal year.
pub mod fiscal_year;

/// `PackedOrdinal` — legacy `yymmdd` integer keys.
pub mod packed;

/// `Weekday` — day of the week.
pub mod weekday;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use accounting_period::{AccountingPeriod, ClassificationScheme, WeekPeriod};
pub use date::Date;
pub use fiscal_year::FiscalYearRange;
pub use packed::PackedOrdinal;
pub use weekday::Weekday;
