//! Integrity audit of calendar rows.
//!
//! The audit reads the rows and reports; it never corrects them. Findings come
//! in two grades:
//!
//! - a [`Violation`] breaks a key or range rule the table must satisfy to be
//!   seeded at all (duplicate keys, out-of-range week or period numbers);
//! - an [`Anomaly`] is a suspicious value the data owner should look at
//!   (gaps, broken chaining, key jumps, classification schemes that disagree
//!   with the primary one). The shipped table carries a few of these on
//!   purpose and they are preserved.

use std::collections::{HashMap, HashSet};

use fc_time::{AccountingPeriod, ClassificationScheme, Date, PackedOrdinal, WeekPeriod, Weekday};
use serde::Serialize;

/// A hard rule broken by the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Violation {
    /// Two rows share a week-ending date.
    DuplicateWeekEnding {
        /// The repeated date.
        date: Date,
    },
    /// Two rows share a sequential key.
    DuplicateSequentialKey {
        /// The repeated key.
        key: i64,
    },
    /// Two rows share a packed ordinal in the same column.
    DuplicateOrdinal {
        /// Column name.
        column: &'static str,
        /// The repeated value.
        ordinal: PackedOrdinal,
    },
    /// A week, period, or quarter number outside its range.
    OutOfRange {
        /// Week-ending date of the row.
        date: Date,
        /// Column name.
        column: &'static str,
        /// Stored value.
        value: u8,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::DuplicateWeekEnding { date } => {
                write!(f, "week-ending date {date} appears more than once")
            }
            Violation::DuplicateSequentialKey { key } => {
                write!(f, "sequential key {key} appears more than once")
            }
            Violation::DuplicateOrdinal { column, ordinal } => {
                write!(f, "{column} value {ordinal} appears more than once")
            }
            Violation::OutOfRange { date, column, value } => {
                write!(f, "{date}: {column} = {value} is out of range")
            }
        }
    }
}

/// A suspicious value, reported and kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Anomaly {
    /// Chronological neighbours are not seven days apart.
    CalendarGap {
        /// Earlier week-ending date.
        after: Date,
        /// Later week-ending date.
        before: Date,
        /// Days between them.
        days: i32,
    },
    /// The week-ending date is not a Saturday.
    UnexpectedWeekday {
        /// Week-ending date.
        date: Date,
        /// Its actual weekday.
        weekday: Weekday,
    },
    /// `ACC_WKEND_N` is not the packing of the week-ending date.
    OrdinalMismatch {
        /// Week-ending date.
        date: Date,
        /// Stored value.
        stored: PackedOrdinal,
        /// Packing of `date`.
        expected: PackedOrdinal,
    },
    /// `ACC_APWKEND` is not the packing of the date seven days later.
    NextOrdinalMismatch {
        /// Week-ending date.
        date: Date,
        /// Stored value.
        stored: PackedOrdinal,
        /// Packing of `date + 7`.
        expected: PackedOrdinal,
    },
    /// No row ends seven days later (the last row excepted), or the date
    /// seven days later is past `Date::MAX`.
    MissingSuccessor {
        /// Week-ending date.
        date: Date,
    },
    /// The sequential key does not advance by one inside a fiscal year.
    SequentialKeyStep {
        /// Week-ending date.
        date: Date,
        /// Key of the previous week.
        previous: i64,
        /// Key of this week.
        key: i64,
    },
    /// An alternate classification disagrees with the primary week/period.
    ClassificationDivergence {
        /// Week-ending date.
        date: Date,
        /// The disagreeing scheme.
        scheme: ClassificationScheme,
        /// Primary week/period.
        primary: WeekPeriod,
        /// The scheme's week/period.
        variant: WeekPeriod,
    },
}

impl Anomaly {
    /// Week-ending date the finding is attached to.
    pub fn date(&self) -> Date {
        match self {
            Anomaly::CalendarGap { before, .. } => *before,
            Anomaly::UnexpectedWeekday { date, .. }
            | Anomaly::OrdinalMismatch { date, .. }
            | Anomaly::NextOrdinalMismatch { date, .. }
            | Anomaly::MissingSuccessor { date }
            | Anomaly::SequentialKeyStep { date, .. }
            | Anomaly::ClassificationDivergence { date, .. } => *date,
        }
    }
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anomaly::CalendarGap { after, before, days } => {
                write!(f, "{after} -> {before}: {days} days apart")
            }
            Anomaly::UnexpectedWeekday { date, weekday } => {
                write!(f, "{date}: week ends on a {weekday}")
            }
            Anomaly::OrdinalMismatch { date, stored, expected } => {
                write!(f, "{date}: ACC_WKEND_N {stored}, expected {expected}")
            }
            Anomaly::NextOrdinalMismatch { date, stored, expected } => {
                write!(f, "{date}: ACC_APWKEND {stored}, expected {expected}")
            }
            Anomaly::MissingSuccessor { date } => {
                write!(f, "{date}: no week ending seven days later")
            }
            Anomaly::SequentialKeyStep { date, previous, key } => {
                write!(f, "{date}: sequential key {previous} -> {key}")
            }
            Anomaly::ClassificationDivergence {
                date,
                scheme,
                primary,
                variant,
            } => write!(
                f,
                "{date}: {scheme} week/period {}/{}, primary {}/{}",
                variant.week, variant.period, primary.week, primary.period
            ),
        }
    }
}

/// Result of [`audit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Rows examined.
    pub record_count: usize,
    /// Earliest week-ending date.
    pub first_date: Option<Date>,
    /// Latest week-ending date.
    pub last_date: Option<Date>,
    /// Hard findings.
    pub violations: Vec<Violation>,
    /// Soft findings, in date order.
    pub anomalies: Vec<Anomaly>,
}

impl AuditReport {
    /// No violations. Anomalies do not count.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check `rows` against the table's key, range, and chaining rules.
pub fn audit(rows: &[AccountingPeriod]) -> AuditReport {
    let mut sorted: Vec<&AccountingPeriod> = rows.iter().collect();
    sorted.sort_by_key(|r| r.week_ending_date);

    let violations = find_violations(&sorted);
    let anomalies = find_anomalies(&sorted);

    for v in &violations {
        tracing::warn!(violation = %v, "calendar violation");
    }
    for a in &anomalies {
        tracing::warn!(anomaly = %a, "calendar anomaly");
    }

    let report = AuditReport {
        record_count: rows.len(),
        first_date: sorted.first().map(|r| r.week_ending_date),
        last_date: sorted.last().map(|r| r.week_ending_date),
        violations,
        anomalies,
    };
    tracing::info!(
        records = report.record_count,
        violations = report.violations.len(),
        anomalies = report.anomalies.len(),
        "calendar audit finished"
    );
    report
}

fn find_violations(sorted: &[&AccountingPeriod]) -> Vec<Violation> {
    let mut out = Vec::new();

    let mut dates = HashSet::new();
    let mut keys = HashSet::new();
    let mut ordinals = HashSet::new();
    let mut next_ordinals = HashSet::new();
    for row in sorted {
        if !dates.insert(row.week_ending_date) {
            out.push(Violation::DuplicateWeekEnding {
                date: row.week_ending_date,
            });
        }
        if !keys.insert(row.sequential_key) {
            out.push(Violation::DuplicateSequentialKey {
                key: row.sequential_key,
            });
        }
        if !ordinals.insert(row.week_ending_ordinal) {
            out.push(Violation::DuplicateOrdinal {
                column: "ACC_WKEND_N",
                ordinal: row.week_ending_ordinal,
            });
        }
        if !next_ordinals.insert(row.next_week_ordinal) {
            out.push(Violation::DuplicateOrdinal {
                column: "ACC_APWKEND",
                ordinal: row.next_week_ordinal,
            });
        }

        let checks = [
            ("ACC_WEEKN", row.fiscal_week, 53),
            ("ACC_PERIOD", row.fiscal_period, 12),
            ("ACC_QUARTER", row.fiscal_quarter, 4),
            ("ACC_CALPERIOD", row.calendar_period, 12),
            ("ACC_CLN60_WEEK", row.cln60.week, 53),
            ("ACC_CLN60_PERIOD", row.cln60.period, 12),
            ("ACC_CLN61_WEEK", row.cln61.week, 53),
            ("ACC_CLN61_PERIOD", row.cln61.period, 12),
            ("ACC_CLN7X_WEEK", row.cln7x.week, 53),
            ("ACC_CLN7X_PERIOD", row.cln7x.period, 12),
            ("ACC_CLN6X_WEEK", row.cln6x.week, 53),
            ("ACC_CLN6X_PERIOD", row.cln6x.period, 12),
        ];
        for (column, value, max) in checks {
            if !(1..=max).contains(&value) {
                out.push(Violation::OutOfRange {
                    date: row.week_ending_date,
                    column,
                    value,
                });
            }
        }
    }
    out
}

fn find_anomalies(sorted: &[&AccountingPeriod]) -> Vec<Anomaly> {
    let mut out = Vec::new();
    let by_date: HashMap<Date, &AccountingPeriod> =
        sorted.iter().map(|r| (r.week_ending_date, *r)).collect();

    for (i, row) in sorted.iter().enumerate() {
        let date = row.week_ending_date;
        let prev = i.checked_sub(1).map(|p| sorted[p]);

        if let Some(prev) = prev {
            let days = date - prev.week_ending_date;
            if days != 7 {
                out.push(Anomaly::CalendarGap {
                    after: prev.week_ending_date,
                    before: date,
                    days,
                });
            }
        }

        let weekday = date.weekday();
        if weekday != Weekday::WEEK_ENDING {
            out.push(Anomaly::UnexpectedWeekday { date, weekday });
        }

        let expected = PackedOrdinal::from_date(date);
        if row.week_ending_ordinal != expected {
            out.push(Anomaly::OrdinalMismatch {
                date,
                stored: row.week_ending_ordinal,
                expected,
            });
        }

        // a week ending at the top of the date range has no successor date
        match date.add_days(7) {
            Ok(next) => {
                let expected = PackedOrdinal::from_date(next);
                if row.next_week_ordinal != expected {
                    out.push(Anomaly::NextOrdinalMismatch {
                        date,
                        stored: row.next_week_ordinal,
                        expected,
                    });
                }
                let is_last = i + 1 == sorted.len();
                if !is_last && !by_date.contains_key(&next) {
                    out.push(Anomaly::MissingSuccessor { date });
                }
            }
            Err(_) => out.push(Anomaly::MissingSuccessor { date }),
        }

        // keys restart at each fiscal year's week 1
        if let Some(prev) = prev {
            if row.fiscal_week != 1
                && prev.sequential_key.checked_add(1) != Some(row.sequential_key)
            {
                out.push(Anomaly::SequentialKeyStep {
                    date,
                    previous: prev.sequential_key,
                    key: row.sequential_key,
                });
            }
        }

        let primary = row.primary();
        for scheme in ClassificationScheme::ALL {
            let variant = row.classification(scheme);
            if variant != primary {
                out.push(Anomaly::ClassificationDivergence {
                    date,
                    scheme,
                    primary,
                    variant,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn week(end: Date, fiscal_week: u8, key: i64) -> AccountingPeriod {
        let wp = WeekPeriod::new(fiscal_week, 1);
        AccountingPeriod {
            week_ending_ordinal: PackedOrdinal::from_date(end),
            next_week_ordinal: PackedOrdinal::from_date(end + 7),
            fiscal_week,
            fiscal_period: 1,
            fiscal_quarter: 1,
            calendar_period: 1,
            cln60: wp,
            cln61: wp,
            cln7x: wp,
            cln6x: wp,
            week_ending_date: end,
            sequential_key: key,
        }
    }

    fn clean_run() -> Vec<AccountingPeriod> {
        let start = date(2010, 1, 9);
        (0..4).map(|i| week(start + 7 * i, i as u8 + 1, 300 + i64::from(i))).collect()
    }

    #[test]
    fn clean_rows_have_no_findings() {
        let report = audit(&clean_run());
        assert!(report.is_clean());
        assert!(report.anomalies.is_empty());
        assert_eq!(report.first_date, Some(date(2010, 1, 9)));
        assert_eq!(report.last_date, Some(date(2010, 1, 30)));
    }

    #[test]
    fn empty_input() {
        let report = audit(&[]);
        assert!(report.is_clean());
        assert_eq!(report.record_count, 0);
        assert_eq!(report.first_date, None);
    }

    #[test]
    fn duplicate_date_and_key_are_violations() {
        let mut rows = clean_run();
        rows.push(rows[1]);
        let report = audit(&rows);
        assert!(!report.is_clean());
        assert!(report
            .violations
            .contains(&Violation::DuplicateWeekEnding { date: date(2010, 1, 16) }));
        assert!(report
            .violations
            .contains(&Violation::DuplicateSequentialKey { key: 301 }));
        assert!(report.violations.contains(&Violation::DuplicateOrdinal {
            column: "ACC_APWKEND",
            ordinal: PackedOrdinal::new(100123),
        }));
    }

    #[test]
    fn out_of_range_period() {
        let mut rows = clean_run();
        rows[2].fiscal_period = 13;
        rows[2].cln6x.period = 13;
        let report = audit(&rows);
        let columns: Vec<_> = report
            .violations
            .iter()
            .map(|v| match v {
                Violation::OutOfRange { column, value: 13, .. } => *column,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(columns, ["ACC_PERIOD", "ACC_CLN6X_PERIOD"]);
    }

    #[test]
    fn gap_is_reported_with_missing_successor() {
        let mut rows = clean_run();
        rows.remove(2);
        let report = audit(&rows);
        assert!(report.is_clean());
        assert!(report.anomalies.contains(&Anomaly::CalendarGap {
            after: date(2010, 1, 16),
            before: date(2010, 1, 30),
            days: 14,
        }));
        assert!(report
            .anomalies
            .contains(&Anomaly::MissingSuccessor { date: date(2010, 1, 16) }));
    }

    #[test]
    fn broken_chaining_is_reported_not_fixed() {
        let mut rows = clean_run();
        rows[0].next_week_ordinal = PackedOrdinal::new(100117);
        let report = audit(&rows);
        assert_eq!(
            report.anomalies,
            [Anomaly::NextOrdinalMismatch {
                date: date(2010, 1, 9),
                stored: PackedOrdinal::new(100117),
                expected: PackedOrdinal::new(100116),
            }]
        );
        assert_eq!(rows[0].next_week_ordinal.value(), 100117);
    }

    #[test]
    fn last_representable_week_has_no_successor() {
        let end = date(2199, 12, 28);
        let mut row = clean_run()[0];
        row.week_ending_date = end;
        row.week_ending_ordinal = PackedOrdinal::from_date(end);
        row.next_week_ordinal = PackedOrdinal::new(1040);
        let report = audit(&[row]);
        assert!(report.is_clean());
        assert_eq!(report.last_date, Some(end));
        assert!(report
            .anomalies
            .contains(&Anomaly::MissingSuccessor { date: end }));
        assert!(!report
            .anomalies
            .iter()
            .any(|a| matches!(a, Anomaly::NextOrdinalMismatch { .. })));
    }

    #[test]
    fn key_jump_at_week_one_is_not_flagged() {
        let mut rows = clean_run();
        let next_year = week(date(2010, 2, 6), 1, 360);
        rows.push(next_year);
        assert!(audit(&rows).anomalies.is_empty());

        rows[4] = week(date(2010, 2, 6), 5, 360);
        let report = audit(&rows);
        assert_eq!(
            report.anomalies,
            [Anomaly::SequentialKeyStep {
                date: date(2010, 2, 6),
                previous: 303,
                key: 360,
            }]
        );
    }

    #[test]
    fn wrong_weekday() {
        let mut rows = clean_run();
        let friday = date(2010, 1, 29);
        rows[3].week_ending_date = friday;
        rows[3].week_ending_ordinal = PackedOrdinal::from_date(friday);
        rows[3].next_week_ordinal = PackedOrdinal::from_date(friday + 7);
        let report = audit(&rows);
        assert!(report.anomalies.contains(&Anomaly::UnexpectedWeekday {
            date: friday,
            weekday: Weekday::Friday,
        }));
    }

    #[test]
    fn display_and_json() {
        let a = Anomaly::ClassificationDivergence {
            date: date(2024, 4, 13),
            scheme: ClassificationScheme::Cln60,
            primary: WeekPeriod::new(15, 4),
            variant: WeekPeriod::new(15, 5),
        };
        assert_eq!(a.to_string(), "2024-04-13: CLN60 week/period 15/5, primary 15/4");
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["kind"], "ClassificationDivergence");
        assert_eq!(json["scheme"], "Cln60");
        assert_eq!(json["variant"]["period"], 5);
    }
}
