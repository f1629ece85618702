//! `PackedOrdinal` — the legacy six-digit week key.
//!
//! The mainframe calendar keyed weeks by `yymmdd` packed into an integer, so
//! leading zeros vanish: 2000-01-01 is `101`, 2005-12-03 is `51203`, and
//! 1999-01-16 is `990116`. The century is lost, which is why the packed value
//! is carried as data next to the real date rather than derived on the fly.

use serde::{Deserialize, Serialize};

use crate::date::Date;

/// A legacy `yymmdd` week key (`ACC_WKEND_N`, `ACC_APWKEND`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackedOrdinal(i32);

impl PackedOrdinal {
    /// Wrap a raw column value as shipped. No validation: the legacy data is
    /// authoritative.
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// The packing the legacy system would compute for `date`.
    pub fn from_date(date: Date) -> Self {
        Self(date.to_yyyymmdd() % 1_000_000)
    }

    /// The raw integer.
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for PackedOrdinal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PackedOrdinal> for i32 {
    fn from(p: PackedOrdinal) -> i32 {
        p.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn leading_zeros_are_dropped() {
        assert_eq!(PackedOrdinal::from_date(date(2000, 1, 1)).value(), 101);
        assert_eq!(PackedOrdinal::from_date(date(2005, 12, 3)).value(), 51203);
        assert_eq!(PackedOrdinal::from_date(date(1999, 1, 16)).value(), 990116);
        assert_eq!(PackedOrdinal::from_date(date(2024, 12, 28)).value(), 241228);
    }

    #[test]
    fn century_is_ambiguous() {
        // 1905 and 2005 pack to the same key
        assert_eq!(
            PackedOrdinal::from_date(date(1905, 12, 3)),
            PackedOrdinal::from_date(date(2005, 12, 3))
        );
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&PackedOrdinal::new(101)).unwrap();
        assert_eq!(json, "101");
    }
}
