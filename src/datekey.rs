use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

use crate::{Error, Result, NOTE_KEY_PREFIX};

const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

/// Canonical identifier for a calendar day, rendered as `YYYY-MM-DD`.
///
/// Keys order chronologically, which matches the lexicographic order of their
/// string form for every supported year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Builds the key for the calendar day of `date`.
    ///
    /// Only the value's own year, month and day fields are read, so a
    /// `DateTime<Local>` maps to its local calendar day whatever the time of day.
    pub fn from_date<D: Datelike>(date: &D) -> Result<Self> {
        let (year, month, day) = (date.year(), date.month(), date.day());
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(Error::InvalidDate(format!(
                "year {} is outside {}..={}",
                year, MIN_YEAR, MAX_YEAR
            )));
        }
        NaiveDate::from_ymd_opt(year, month, day)
            .map(DateKey)
            .ok_or_else(|| Error::InvalidDate(format!("{:04}-{:02}-{:02}", year, month, day)))
    }

    /// Parses user-supplied date input such as `2024-03-05`.
    ///
    /// Unlike [`DateKey::parse`], failure here is the caller's bad input and is
    /// reported as [`Error::InvalidDate`].
    pub fn parse_date(input: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
            .map_err(|e| Error::InvalidDate(format!("{:?}: {}", input, e)))?;
        Self::from_date(&date)
    }

    /// Parses the canonical key form. Anything but exactly `YYYY-MM-DD` naming
    /// a real day is rejected with [`Error::InvalidKey`].
    pub fn parse(key: &str) -> Result<Self> {
        let invalid = || Error::InvalidKey(key.to_string());
        let bytes = key.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(invalid());
        }
        let field = |range: std::ops::Range<usize>| -> Result<u32> {
            let part = &key[range];
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };
        let year = field(0..4)? as i32;
        let month = field(5..7)?;
        let day = field(8..10)?;
        NaiveDate::from_ymd_opt(year, month, day)
            .map(DateKey)
            .ok_or_else(invalid)
    }

    /// Extracts the key from a raw storage key.
    ///
    /// Returns `None` for keys outside the note namespace, and
    /// `Some(Err(InvalidKey))` for prefixed keys with a malformed date part.
    pub fn from_storage_key(raw: &str) -> Option<Result<Self>> {
        raw.strip_prefix(NOTE_KEY_PREFIX).map(Self::parse)
    }

    /// The raw key this note is stored under.
    pub fn storage_key(&self) -> String {
        format!("{}{}", NOTE_KEY_PREFIX, self)
    }

    /// The calendar day this key denotes.
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

/// Converts a date to its key.
pub fn to_key<D: Datelike>(date: &D) -> Result<DateKey> {
    DateKey::from_date(date)
}

/// Converts a key back to the calendar day it denotes (local midnight is
/// `from_key(k)?.and_hms_opt(0, 0, 0)`).
pub fn from_key(key: &str) -> Result<NaiveDate> {
    DateKey::parse(key).map(|k| k.date())
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl FromStr for DateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<DateKey> for NaiveDate {
    fn from(key: DateKey) -> Self {
        key.0
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
