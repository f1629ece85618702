//! `Date` type.
//!
//! Dates are stored as a serial number of days. Serial 1 is January 1, 1900
//! and the valid range is 1900-01-01 to 2199-12-31, which comfortably covers
//! the fiscal calendar (1999–2024) and the legacy packed keys derived from it.
//!
//! The canonical text form is ISO-8601 (`YYYY-MM-DD`); the legacy numeric
//! form used by the `ACC_WKEND2_N` column is `yyyymmdd`.

use std::str::FromStr;

use fc_core::errors::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::weekday::Weekday;

/// A calendar date represented as a serial number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(i32);

// ── Constants ─────────────────────────────────────────────────────────────────

impl Date {
    /// Minimum valid date: January 1, 1900.
    pub const MIN: Date = Date(1);

    /// Maximum valid date: December 31, 2199.
    pub const MAX: Date = Date(109_573);

    // ── Constructors ─────────────────────────────────────────────────────────

    /// Create a date from a serial number.
    pub fn from_serial(serial: i32) -> Result<Self> {
        if serial <= 0 {
            return Err(Error::Date("serial number must be positive".into()));
        }
        let d = Date(serial);
        if d > Self::MAX {
            return Err(Error::Date(format!("serial {serial} exceeds maximum date")));
        }
        Ok(d)
    }

    /// Create a date from year, month (1–12), and day-of-month (1–31).
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Result<Self> {
        if !(1900..=2199).contains(&year) {
            return Err(Error::Date(format!(
                "year {year} out of range [1900, 2199]"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::Date(format!("month {month} out of range [1, 12]")));
        }
        let days_in = days_in_month(year, month);
        if day == 0 || day > days_in {
            return Err(Error::Date(format!(
                "day {day} out of range [1, {days_in}] for {year}-{month:02}"
            )));
        }
        Ok(Date(serial_from_ymd(year, month, day)))
    }

    /// Create a date from the eight-digit `yyyymmdd` integer form.
    pub fn from_yyyymmdd(value: i32) -> Result<Self> {
        if !(10_000_000..=99_999_999).contains(&value) {
            return Err(Error::Date(format!("{value} is not an eight-digit yyyymmdd value")));
        }
        let year = (value / 10_000) as u16;
        let month = (value / 100 % 100) as u8;
        let day = (value % 100) as u8;
        Self::from_ymd(year, month, day)
    }

    /// Today's date on the local system clock.
    pub fn today() -> Result<Self> {
        use chrono::Datelike;
        let now = chrono::Local::now().date_naive();
        let year = u16::try_from(now.year())
            .map_err(|_| Error::Date(format!("year {} out of range", now.year())))?;
        Self::from_ymd(year, now.month() as u8, now.day() as u8)
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Return the serial number.
    pub fn serial(&self) -> i32 {
        self.0
    }

    /// Return the year (1900–2199).
    pub fn year(&self) -> u16 {
        ymd_from_serial(self.0).0
    }

    /// Return the month (1–12).
    pub fn month(&self) -> u8 {
        ymd_from_serial(self.0).1
    }

    /// Return the day of the month (1–31).
    pub fn day_of_month(&self) -> u8 {
        ymd_from_serial(self.0).2
    }

    /// Return the date as a `yyyymmdd` integer (e.g. `20051203`).
    pub fn to_yyyymmdd(&self) -> i32 {
        let (y, m, d) = ymd_from_serial(self.0);
        y as i32 * 10_000 + m as i32 * 100 + d as i32
    }

    /// Return the weekday.
    pub fn weekday(&self) -> Weekday {
        // 1900-01-01 is a Monday (ordinal 1).
        let w = ((self.0 - 1).rem_euclid(7) + 1) as u8;
        Weekday::from_ordinal(w).expect("rem_euclid always in 1..=7")
    }

    // ── Arithmetic ────────────────────────────────────────────────────────────

    /// Advance by `n` days.  Returns an error if the result is out of range.
    pub fn add_days(self, n: i32) -> Result<Self> {
        match self.0.checked_add(n) {
            Some(serial) if serial > 0 && serial <= Self::MAX.0 => Ok(Date(serial)),
            _ => Err(Error::Date(format!(
                "date arithmetic: {self} {n:+} days is out of range"
            ))),
        }
    }
}

// ── Arithmetic operators ──────────────────────────────────────────────────────

impl std::ops::Add<i32> for Date {
    type Output = Self;
    fn add(self, rhs: i32) -> Self {
        self.add_days(rhs).expect("date addition overflow")
    }
}

impl std::ops::Sub<i32> for Date {
    type Output = Self;
    fn sub(self, rhs: i32) -> Self {
        self.add_days(-rhs).expect("date subtraction underflow")
    }
}

impl std::ops::Sub<Date> for Date {
    type Output = i32;
    fn sub(self, rhs: Date) -> i32 {
        self.0 - rhs.0
    }
}

// ── Text forms ────────────────────────────────────────────────────────────────

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (y, m, d) = ymd_from_serial(self.0);
        write!(f, "{y:04}-{m:02}-{d:02}")
    }
}

impl std::fmt::Debug for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (y, m, d) = ymd_from_serial(self.0);
        write!(f, "Date({y:04}-{m:02}-{d:02})")
    }
}

impl FromStr for Date {
    type Err = Error;

    /// Parse a strict ISO-8601 calendar date (`YYYY-MM-DD`).
    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let shape_ok = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !shape_ok {
            return Err(Error::Date(format!("'{s}' is not an ISO date (YYYY-MM-DD)")));
        }
        let num = |range: std::ops::Range<usize>| -> u16 {
            s[range]
                .bytes()
                .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
        };
        Self::from_ymd(num(0..4), num(5..7) as u8, num(8..10) as u8)
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Whether a given year is a leap year.
pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in a given month/year.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    debug_assert!((1..=12).contains(&month));
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => unreachable!(),
    }
}

/// Convert (year, month, day) to a serial number.
///
/// Serial 1 = 1900-01-01.
fn serial_from_ymd(year: u16, month: u8, day: u8) -> i32 {
    let y = year as i32;
    let m = month as i32;
    let d = day as i32;

    // Days in years 1900..year
    let mut serial = (y - 1900) * 365;
    // Leap years in [1900, year)
    serial += (y - 1901) / 4 - (y - 1901) / 100 + (y - 1601) / 400;
    serial += MONTH_OFFSET[m as usize - 1] as i32;
    if m > 2 && is_leap_year(year) {
        serial += 1;
    }
    serial += d;
    serial
}

/// Decompose a serial number into (year, month, day).
fn ymd_from_serial(serial: i32) -> (u16, u8, u8) {
    // Estimate, then adjust until serial falls within the year
    let mut y = (serial / 365 + 1900) as u16;
    loop {
        let start_of_year = serial_from_ymd(y, 1, 1);
        if serial < start_of_year {
            y -= 1;
        } else if serial >= serial_from_ymd(y + 1, 1, 1) {
            y += 1;
        } else {
            break;
        }
    }
    let doy = serial - serial_from_ymd(y, 1, 1) + 1;
    let mut m = 1u8;
    let mut remaining = doy;
    loop {
        let days = days_in_month(y, m) as i32;
        if remaining <= days {
            break;
        }
        remaining -= days;
        m += 1;
    }
    (y, m, remaining as u8)
}

/// Cumulative day-of-year offset at the start of each month (non-leap).
const MONTH_OFFSET: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

// ── Tests ─────────────────────────────────────────────────────────────────────
