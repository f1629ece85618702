//! # fiscal-calendar
//!
//! Reference data for a retail 52/53-week fiscal calendar, 1999 through 2024,
//! together with the tools that check it and seed it into a database.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on this crate rather than the individual
//! `fc-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use fiscal_calendar::seed::AccountingCalendar;
//! use fiscal_calendar::time::Date;
//!
//! let cal = AccountingCalendar::embedded();
//! let week = cal.week_containing(Date::from_ymd(2005, 12, 1).unwrap()).unwrap();
//! assert_eq!(week.sequential_key, 0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Error definitions, settings, and logging setup.
pub use fc_core as core;

/// Date, packed legacy key, and fiscal-week record types.
pub use fc_time as time;

/// The embedded table, audit, lookups, and seeders.
pub use fc_seed as seed;
