//! Billing period type.
//!
//! A `Period` is one calendar month, parsed from and displayed as `YYYY-MM`. It names the
//! `month=` partition of both the input and output key layouts.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// One calendar month, e.g. `2025-11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a new `Period`. The month is expected to be in `1..=12`; parsed values are
    /// validated by `FromStr`.
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the calendar month before `today`. January rolls back to December of the
    /// previous year. This is the default period for a run: statements for a month are
    /// produced once that month has closed.
    pub fn previous(today: NaiveDate) -> Self {
        if today.month() == 1 {
            Self::new(today.year() - 1, 12)
        } else {
            Self::new(today.year(), today.month() - 1)
        }
    }
}

/// An error that can occur when parsing strings into `Period` values.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("invalid period '{0}': expected YYYY-MM")]
pub struct PeriodParseError(String);

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PeriodParseError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) {
            return Err(err());
        }
        Ok(Self::new(year, month))
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Period::from_str(&s).map_err(serde::de::Error::custom)
    }
}
