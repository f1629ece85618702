//! # fc-seed
//!
//! The `CALDAR_RECORD` fiscal calendar: the embedded seed table, its
//! relational schema, an integrity audit, indexed lookups, and seeders that
//! write the table to a SQL script or a SQLite database.
//!
//! ```
//! use fc_seed::{records, AccountingCalendar, RECORD_COUNT};
//!
//! assert_eq!(records().len(), RECORD_COUNT);
//! let range = AccountingCalendar::embedded().year_start_and_end(2024).unwrap();
//! assert_eq!(range.fiscal_begin_date.to_string(), "2023-12-31");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Integrity audit (violations and anomalies).
pub mod audit;

/// `AccountingCalendar` lookups.
pub mod calendar;

/// `SeedConfig`.
pub mod config;

/// `SeedError`.
pub mod error;

/// `CALDAR_RECORD` table definition and row encoding.
pub mod schema;

/// `EntitySeeder`, checksums, and the SQL script seeder.
pub mod seeder;

/// SQLite seeder.
pub mod sqlite;

/// The embedded table.
pub mod table;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use audit::{audit, Anomaly, AuditReport, Violation};
pub use calendar::AccountingCalendar;
pub use config::SeedConfig;
pub use error::{Result, SeedError};
pub use schema::{TableSchema, CALDAR_RECORD};
pub use seeder::{checksum, EntitySeeder, SeedOutcome, SqlScriptSeeder};
pub use sqlite::{read_table, SeedHistory, SqliteSeeder};
pub use table::{load, records, seed, write_csv, RECORD_COUNT};
