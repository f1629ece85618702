//! The static `CALDAR_RECORD` table.
//!
//! The rows ship in `data/caldar_record.csv`, embedded at compile time and
//! parsed once on first access. The order is the order of the source data
//! (ascending `ACC_WKEND_N`, which puts the 2000s ahead of 1999) and is kept
//! as is, as are the values: the table is reproduced, never recomputed.

use std::io::Write;
use std::sync::OnceLock;

use fc_core::errors::{Error, Result};
use fc_time::{AccountingPeriod, Date, PackedOrdinal, WeekPeriod};
use serde::{Deserialize, Serialize};

use crate::error::SeedError;
use crate::schema::CALDAR_RECORD;
use crate::seeder::{EntitySeeder, SeedOutcome};

/// Number of rows in the embedded table.
pub const RECORD_COUNT: usize = 1356;

/// The embedded CSV text.
pub const EMBEDDED_CSV: &str = include_str!("../data/caldar_record.csv");

static TABLE: OnceLock<Vec<AccountingPeriod>> = OnceLock::new();

/// The complete embedded table, in source order.
///
/// # Panics
/// Panics on first access if the embedded data is malformed. That is a build
/// defect, not a runtime condition, and the table's own tests catch it.
pub fn records() -> &'static [AccountingPeriod] {
    TABLE.get_or_init(|| match load(EMBEDDED_CSV) {
        Ok(rows) => {
            tracing::debug!(rows = rows.len(), "parsed embedded CALDAR_RECORD table");
            rows
        }
        Err(e) => panic!("embedded CALDAR_RECORD table is malformed: {e}"),
    })
}

/// Register the embedded table with a seeding facility.
pub fn seed<S: EntitySeeder + ?Sized>(seeder: &mut S) -> Result<SeedOutcome, SeedError> {
    seeder.has_data(&CALDAR_RECORD, records())
}

/// One CSV line. Field names are the legacy column names.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "ACC_WKEND_N")]
    week_ending_ordinal: i32,
    #[serde(rename = "ACC_APWKEND")]
    next_week_ordinal: i32,
    #[serde(rename = "ACC_WEEKN")]
    fiscal_week: u8,
    #[serde(rename = "ACC_PERIOD")]
    fiscal_period: u8,
    #[serde(rename = "ACC_QUARTER")]
    fiscal_quarter: u8,
    #[serde(rename = "ACC_CALPERIOD")]
    calendar_period: u8,
    #[serde(rename = "ACC_CLN60_WEEK")]
    cln60_week: u8,
    #[serde(rename = "ACC_CLN60_PERIOD")]
    cln60_period: u8,
    #[serde(rename = "ACC_CLN61_WEEK")]
    cln61_week: u8,
    #[serde(rename = "ACC_CLN61_PERIOD")]
    cln61_period: u8,
    #[serde(rename = "ACC_CLN7X_WEEK")]
    cln7x_week: u8,
    #[serde(rename = "ACC_CLN7X_PERIOD")]
    cln7x_period: u8,
    #[serde(rename = "ACC_CLN6X_WEEK")]
    cln6x_week: u8,
    #[serde(rename = "ACC_CLN6X_PERIOD")]
    cln6x_period: u8,
    #[serde(rename = "WEEK_ENDING_DATE")]
    week_ending_date: String,
    #[serde(rename = "ACC_ALT_KEY_NUM")]
    sequential_key: i64,
}

impl CsvRow {
    fn into_period(self, line: usize) -> Result<AccountingPeriod> {
        let week_ending_date: Date = self
            .week_ending_date
            .parse()
            .map_err(|e: Error| Error::Parse {
                line,
                message: e.to_string(),
            })?;
        Ok(AccountingPeriod {
            week_ending_ordinal: PackedOrdinal::new(self.week_ending_ordinal),
            next_week_ordinal: PackedOrdinal::new(self.next_week_ordinal),
            fiscal_week: self.fiscal_week,
            fiscal_period: self.fiscal_period,
            fiscal_quarter: self.fiscal_quarter,
            calendar_period: self.calendar_period,
            cln60: WeekPeriod::new(self.cln60_week, self.cln60_period),
            cln61: WeekPeriod::new(self.cln61_week, self.cln61_period),
            cln7x: WeekPeriod::new(self.cln7x_week, self.cln7x_period),
            cln6x: WeekPeriod::new(self.cln6x_week, self.cln6x_period),
            week_ending_date,
            sequential_key: self.sequential_key,
        })
    }

    fn from_period(p: &AccountingPeriod) -> Self {
        Self {
            week_ending_ordinal: p.week_ending_ordinal.value(),
            next_week_ordinal: p.next_week_ordinal.value(),
            fiscal_week: p.fiscal_week,
            fiscal_period: p.fiscal_period,
            fiscal_quarter: p.fiscal_quarter,
            calendar_period: p.calendar_period,
            cln60_week: p.cln60.week,
            cln60_period: p.cln60.period,
            cln61_week: p.cln61.week,
            cln61_period: p.cln61.period,
            cln7x_week: p.cln7x.week,
            cln7x_period: p.cln7x.period,
            cln6x_week: p.cln6x.week,
            cln6x_period: p.cln6x.period,
            week_ending_date: p.week_ending_date.to_string(),
            sequential_key: p.sequential_key,
        }
    }
}

/// Parse a table in the embedded CSV layout.
///
/// Errors carry the 1-based line number of the offending row (the header is
/// line 1).
pub fn load(csv_text: &str) -> Result<Vec<AccountingPeriod>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_text.as_bytes());

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = idx + 2;
        let row = result.map_err(|e| Error::Parse {
            line: e
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(line),
            message: e.to_string(),
        })?;
        rows.push(row.into_period(line)?);
    }
    Ok(rows)
}

/// Write rows in the embedded CSV layout.
pub fn write_csv<W: Write>(rows: &[AccountingPeriod], out: W) -> Result<(), SeedError> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(CsvRow::from_period(row))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ACC_WKEND_N,ACC_APWKEND,ACC_WEEKN,ACC_PERIOD,ACC_QUARTER,ACC_CALPERIOD,ACC_CLN60_WEEK,ACC_CLN60_PERIOD,ACC_CLN61_WEEK,ACC_CLN61_PERIOD,ACC_CLN7X_WEEK,ACC_CLN7X_PERIOD,ACC_CLN6X_WEEK,ACC_CLN6X_PERIOD,WEEK_ENDING_DATE,ACC_ALT_KEY_NUM";

    #[test]
    fn embedded_table_parses() {
        assert_eq!(records().len(), RECORD_COUNT);
    }

    #[test]
    fn first_and_last_rows_in_source_order() {
        let rows = records();
        let first = rows[0];
        assert_eq!(first.week_ending_ordinal.value(), 101);
        assert_eq!(first.week_ending_date, Date::from_ymd(2000, 1, 1).unwrap());
        assert_eq!(first.sequential_key, -356);
        assert_eq!((first.fiscal_week, first.fiscal_period, first.fiscal_quarter), (52, 12, 1));

        let last = rows[RECORD_COUNT - 1];
        assert_eq!(last.week_ending_ordinal.value(), 991225);
        assert_eq!(last.next_week_ordinal.value(), 101);
        assert_eq!(last.week_ending_date, Date::from_ymd(1999, 12, 25).unwrap());
    }

    #[test]
    fn malformed_date_names_the_line() {
        let text = format!(
            "{HEADER}\n101,108,52,12,1,12,52,12,52,12,52,12,52,12,2000-01-01,-356\n108,115,1,1,1,1,1,1,1,1,1,1,1,1,2000-02-30,-347\n"
        );
        let err = load(&text).unwrap_err();
        match err {
            Error::Parse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("day 30"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_numeric_field_is_a_parse_error() {
        let text = format!("{HEADER}\n101,108,fifty,12,1,12,52,12,52,12,52,12,52,12,2000-01-01,-356\n");
        assert!(matches!(load(&text), Err(Error::Parse { line: 2, .. })));
    }

    #[test]
    fn csv_round_trip() {
        let mut buf = Vec::new();
        write_csv(records(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(HEADER));
        assert_eq!(load(&text).unwrap(), records());
    }

    #[test]
    fn re_export_matches_the_embedded_file() {
        let mut buf = Vec::new();
        write_csv(records(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), EMBEDDED_CSV);
    }
}
