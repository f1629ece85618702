//! `FiscalYearRange` — the first and last day of one or more fiscal years.

use serde::{Deserialize, Serialize};

use crate::date::Date;

/// Inclusive date bounds of a fiscal year (or a run of consecutive years).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalYearRange {
    /// First day: the Sunday that opens week 1.
    pub fiscal_begin_date: Date,
    /// Last day: the week-ending Saturday of the final week.
    pub fiscal_end_date: Date,
}

impl FiscalYearRange {
    /// Whether `date` lies inside the range.
    pub fn contains(&self, date: Date) -> bool {
        (self.fiscal_begin_date..=self.fiscal_end_date).contains(&date)
    }

    /// Number of whole weeks covered.
    pub fn weeks(&self) -> i32 {
        (self.fiscal_end_date - self.fiscal_begin_date + 1) / 7
    }
}

impl std::fmt::Display for FiscalYearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.fiscal_begin_date, self.fiscal_end_date)
    }
}
