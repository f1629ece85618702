//! Lookups over the calendar table.
//!
//! [`AccountingCalendar`] indexes the rows once and answers the reads the
//! downstream services make: the week for a date, the first and last day of a
//! fiscal year, the range spanned by several years.
//!
//! A fiscal year starts at a row whose `fiscal_week` is 1 and runs until the
//! next such row. It is labelled with the calendar year of its first
//! week-ending date. Rows before the first week 1 belong to no fiscal year.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::sync::OnceLock;

use fc_core::ensure;
use fc_core::errors::{Error, Result};
use fc_core::Settings;
use fc_time::{AccountingPeriod, Date, FiscalYearRange, PackedOrdinal};

use crate::table::records;

/// Indexed view of calendar rows.
#[derive(Debug, Clone)]
pub struct AccountingCalendar<'a> {
    weeks: Vec<&'a AccountingPeriod>,
    by_date: HashMap<Date, usize>,
    by_ordinal: HashMap<PackedOrdinal, usize>,
    by_key: HashMap<i64, usize>,
    years: BTreeMap<u16, Range<usize>>,
    year_of: Vec<Option<u16>>,
}

static EMBEDDED: OnceLock<AccountingCalendar<'static>> = OnceLock::new();

impl<'a> AccountingCalendar<'a> {
    /// Index `rows`. Order does not matter; on duplicate keys the earliest
    /// week wins.
    ///
    /// Each week 1 opens the fiscal year named by its week-ending date's
    /// calendar year. A week 1 whose year is already taken opens nothing:
    /// it and the weeks up to the next week 1 get no fiscal year.
    pub fn new(rows: &'a [AccountingPeriod]) -> Self {
        let mut weeks: Vec<&AccountingPeriod> = rows.iter().collect();
        weeks.sort_by_key(|r| r.week_ending_date);

        let mut by_date = HashMap::with_capacity(weeks.len());
        let mut by_ordinal = HashMap::with_capacity(weeks.len());
        let mut by_key = HashMap::with_capacity(weeks.len());
        let mut years = BTreeMap::new();
        let mut year_of = Vec::with_capacity(weeks.len());

        let mut current: Option<(u16, usize)> = None;
        for (i, w) in weeks.iter().enumerate() {
            by_date.entry(w.week_ending_date).or_insert(i);
            by_ordinal.entry(w.week_ending_ordinal).or_insert(i);
            by_key.entry(w.sequential_key).or_insert(i);

            if w.fiscal_week == 1 {
                if let Some((year, start)) = current.take() {
                    years.insert(year, start..i);
                }
                let year = w.week_ending_date.year();
                if years.contains_key(&year) {
                    // first labelled run keeps the year
                    tracing::warn!(
                        year,
                        week_ending = %w.week_ending_date,
                        "second week 1 in one calendar year, weeks left without a fiscal year"
                    );
                } else {
                    current = Some((year, i));
                }
            }
            year_of.push(current.map(|(year, _)| year));
        }
        if let Some((year, start)) = current {
            years.insert(year, start..weeks.len());
        }

        tracing::debug!(weeks = weeks.len(), years = years.len(), "indexed calendar");
        Self {
            weeks,
            by_date,
            by_ordinal,
            by_key,
            years,
            year_of,
        }
    }

    /// Number of weeks.
    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    /// Whether there are no weeks.
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Weeks in date order.
    pub fn iter(&self) -> impl Iterator<Item = &'a AccountingPeriod> + '_ {
        self.weeks.iter().copied()
    }

    /// The week ending on `date`.
    pub fn by_week_ending(&self, date: Date) -> Option<&'a AccountingPeriod> {
        self.by_date.get(&date).map(|&i| self.weeks[i])
    }

    /// The week with the given `ACC_WKEND_N`.
    pub fn by_ordinal(&self, ordinal: PackedOrdinal) -> Option<&'a AccountingPeriod> {
        self.by_ordinal.get(&ordinal).map(|&i| self.weeks[i])
    }

    /// The week with the given sequential key.
    pub fn by_sequential_key(&self, key: i64) -> Option<&'a AccountingPeriod> {
        self.by_key.get(&key).map(|&i| self.weeks[i])
    }

    /// The week `week.next_week_ordinal` points at.
    pub fn next_week(&self, week: &AccountingPeriod) -> Option<&'a AccountingPeriod> {
        self.by_ordinal(week.next_week_ordinal)
    }

    /// The week whose Sunday..Saturday span contains `date`.
    pub fn week_containing(&self, date: Date) -> Option<&'a AccountingPeriod> {
        self.index_containing(date).map(|i| self.weeks[i])
    }

    fn index_containing(&self, date: Date) -> Option<usize> {
        let i = self.weeks.partition_point(|w| w.week_ending_date < date);
        self.weeks
            .get(i)
            .filter(|w| w.contains(date))
            .map(|_| i)
    }

    /// Fiscal years present, ascending.
    pub fn fiscal_years(&self) -> Vec<u16> {
        self.years.keys().copied().collect()
    }

    /// The fiscal year `date` falls in.
    pub fn fiscal_year_of(&self, date: Date) -> Option<u16> {
        self.index_containing(date).and_then(|i| self.year_of[i])
    }

    /// Weeks of fiscal year `year` in date order; empty for an unknown year.
    pub fn weeks_in_year(&self, year: u16) -> &[&'a AccountingPeriod] {
        self.years
            .get(&year)
            .map(|range| &self.weeks[range.clone()])
            .unwrap_or(&[])
    }

    /// First and last day of fiscal year `year`.
    ///
    /// The first day is the Sunday opening week 1; the last is the
    /// week-ending date of the final week.
    pub fn year_start_and_end(&self, year: u16) -> Result<FiscalYearRange> {
        let weeks = self.weeks_in_year(year);
        match (weeks.first(), weeks.last()) {
            (Some(first), Some(last)) => Ok(FiscalYearRange {
                fiscal_begin_date: first.week_start_date(),
                fiscal_end_date: last.week_ending_date,
            }),
            _ => Err(Error::NotFound(format!("fiscal year {year}"))),
        }
    }

    /// From the first day of `begin_year` to the last day of `end_year`.
    pub fn accounting_range(&self, begin_year: u16, end_year: u16) -> Result<FiscalYearRange> {
        ensure!(
            begin_year <= end_year,
            "begin year {begin_year} is after end year {end_year}"
        );
        let begin = self.year_start_and_end(begin_year)?;
        let end = self.year_start_and_end(end_year)?;
        Ok(FiscalYearRange {
            fiscal_begin_date: begin.fiscal_begin_date,
            fiscal_end_date: end.fiscal_end_date,
        })
    }

    /// The fiscal year of the evaluation date: the `Settings` override if
    /// set, otherwise today.
    pub fn current_fiscal_year(&self) -> Result<u16> {
        let today = match Settings::instance().evaluation_date_serial() {
            Some(serial) => Date::from_serial(serial)?,
            None => Date::today()?,
        };
        self.fiscal_year_of(today)
            .ok_or_else(|| Error::NotFound(format!("no fiscal year contains {today}")))
    }
}

impl AccountingCalendar<'static> {
    /// Calendar over the embedded table, built once.
    pub fn embedded() -> &'static AccountingCalendar<'static> {
        EMBEDDED.get_or_init(|| AccountingCalendar::new(records()))
    }
}
