//! `AccountingPeriod` — one fiscal week of the retail calendar.
//!
//! A row of the `CALDAR_RECORD` table. The primary classification is the
//! fiscal week / period / quarter; four alternate classification schemes
//! (`CLN60`, `CLN61`, `CLN7X`, `CLN6X`) carry their own week/period pair for
//! downstream consumers. They usually agree with the primary pair but are not
//! guaranteed to.

use serde::{Deserialize, Serialize};

use crate::date::Date;
use crate::packed::PackedOrdinal;

/// A week number paired with a period number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekPeriod {
    /// Week within the fiscal year (1–53).
    pub week: u8,
    /// Period ("accounting month", 1–12).
    pub period: u8,
}

impl WeekPeriod {
    /// Pair a week with a period.
    pub const fn new(week: u8, period: u8) -> Self {
        Self { week, period }
    }
}

/// The alternate classification schemes stored on every week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassificationScheme {
    /// `ACC_CLN60_*`.
    Cln60,
    /// `ACC_CLN61_*`.
    Cln61,
    /// `ACC_CLN7X_*`.
    Cln7X,
    /// `ACC_CLN6X_*`.
    Cln6X,
}

impl ClassificationScheme {
    /// All schemes in column order.
    pub const ALL: [ClassificationScheme; 4] = [
        ClassificationScheme::Cln60,
        ClassificationScheme::Cln61,
        ClassificationScheme::Cln7X,
        ClassificationScheme::Cln6X,
    ];

    /// Column-name infix (`"CLN60"` …).
    pub fn code(&self) -> &'static str {
        match self {
            ClassificationScheme::Cln60 => "CLN60",
            ClassificationScheme::Cln61 => "CLN61",
            ClassificationScheme::Cln7X => "CLN7X",
            ClassificationScheme::Cln6X => "CLN6X",
        }
    }
}

impl std::fmt::Display for ClassificationScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One fiscal week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Legacy key of the week-ending date (`ACC_WKEND_N`).
    pub week_ending_ordinal: PackedOrdinal,
    /// Legacy key of the following week's ending date (`ACC_APWKEND`).
    pub next_week_ordinal: PackedOrdinal,
    /// Fiscal week number, 1–53 (`ACC_WEEKN`).
    pub fiscal_week: u8,
    /// Fiscal period, 1–12 (`ACC_PERIOD`).
    pub fiscal_period: u8,
    /// Fiscal quarter, 1–4 (`ACC_QUARTER`).
    pub fiscal_quarter: u8,
    /// Calendar period, 1–12 (`ACC_CALPERIOD`).
    pub calendar_period: u8,
    /// `ACC_CLN60_WEEK` / `ACC_CLN60_PERIOD`.
    pub cln60: WeekPeriod,
    /// `ACC_CLN61_WEEK` / `ACC_CLN61_PERIOD`.
    pub cln61: WeekPeriod,
    /// `ACC_CLN7X_WEEK` / `ACC_CLN7X_PERIOD`.
    pub cln7x: WeekPeriod,
    /// `ACC_CLN6X_WEEK` / `ACC_CLN6X_PERIOD`.
    pub cln6x: WeekPeriod,
    /// The week-ending date, natural key (`ACC_WKEND2_N`).
    pub week_ending_date: Date,
    /// Surrogate key shared with other systems (`ACC_ALT_KEY_NUM`).
    pub sequential_key: i64,
}

impl AccountingPeriod {
    /// The primary week/period pair.
    pub fn primary(&self) -> WeekPeriod {
        WeekPeriod::new(self.fiscal_week, self.fiscal_period)
    }

    /// The week/period pair of an alternate scheme.
    pub fn classification(&self, scheme: ClassificationScheme) -> WeekPeriod {
        match scheme {
            ClassificationScheme::Cln60 => self.cln60,
            ClassificationScheme::Cln61 => self.cln61,
            ClassificationScheme::Cln7X => self.cln7x,
            ClassificationScheme::Cln6X => self.cln6x,
        }
    }

    /// First day of the week (the Sunday six days before the week-ending date),
    /// clamped to [`Date::MIN`].
    pub fn week_start_date(&self) -> Date {
        self.week_ending_date.add_days(-6).unwrap_or(Date::MIN)
    }

    /// Whether `date` falls inside this week.
    pub fn contains(&self, date: Date) -> bool {
        (self.week_start_date()..=self.week_ending_date).contains(&date)
    }
}
