//! Calendar date key model

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A calendar date normalized to its canonical `YYYY-MM-DD` form.
///
/// Built from the local calendar date the user picked; no timezone
/// conversion is applied, so the key always names the day that was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Key for the given calendar date
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The underlying calendar date
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    /// Canonical `YYYY-MM-DD` string
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.format(DATE_KEY_FORMAT).to_string()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

/// Exactly `YYYY-MM-DD`: four-digit year, zero-padded month and day.
fn is_canonical_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

impl FromStr for DateKey {
    type Err = Error;

    /// Only the canonical form is accepted, so a parsed key always prints back
    /// to the same string it was read from.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if !is_canonical_shape(raw) {
            return Err(Error::InvalidInput(format!(
                "invalid date '{s}': expected YYYY-MM-DD"
            )));
        }
        NaiveDate::parse_from_str(raw, DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|error| Error::InvalidInput(format!("invalid date '{s}': {error}")))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
