//! Dynamic cell values for mixed-type columnar data.
//!
//! Parquet columns arrive with whatever physical types the producer chose: amounts may be
//! doubles in one partition and formatted strings in another, dates may be real timestamps or
//! text. `CellValue` holds the decoded value and offers the coercions the pipeline needs.

use crate::model::money;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// One decoded cell of a transaction row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl CellValue {
    /// Coerces the cell to a decimal. Strings may carry a dollar sign and thousands
    /// separators. Returns `None` when the cell has no numeric reading; summary math treats
    /// that as zero.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            CellValue::Int(value) => Some(Decimal::from(*value)),
            CellValue::Float(value) => Decimal::from_f64(*value),
            CellValue::Text(text) => money::parse_decimal(text),
            CellValue::Null | CellValue::Bool(_) | CellValue::Timestamp(_) => None,
        }
    }

    /// Coerces the cell to a timestamp. Text is tried against the common date and datetime
    /// shapes seen in transaction feeds, then RFC 3339.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Timestamp(ts) => Some(*ts),
            CellValue::Text(text) => parse_datetime_text(text.trim()),
            _ => None,
        }
    }

    /// The raw textual form of the cell, used where coercion is not wanted (metadata fields)
    /// or has failed (non-numeric money cells). `Null` renders as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(value) => value.to_string(),
            CellValue::Int(value) => value.to_string(),
            CellValue::Float(value) => value.to_string(),
            CellValue::Text(text) => text.clone(),
            CellValue::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.naive_utc());
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_decimal_from_int() {
        assert_eq!(Some(Decimal::from(500)), CellValue::Int(500).as_decimal());
    }

    #[test]
    fn test_decimal_from_float() {
        let expected = Decimal::from_str("-200.5").unwrap();
        assert_eq!(Some(expected), CellValue::Float(-200.5).as_decimal());
    }

    #[test]
    fn test_decimal_from_formatted_text() {
        let cell = CellValue::Text("$1,300.00".to_string());
        assert_eq!(Some(Decimal::from(1300)), cell.as_decimal());
    }

    #[test]
    fn test_decimal_from_null_is_none() {
        assert_eq!(None, CellValue::Null.as_decimal());
    }

    #[test]
    fn test_decimal_from_words_is_none() {
        assert_eq!(None, CellValue::Text("pending".to_string()).as_decimal());
    }

    #[test]
    fn test_timestamp_from_date_text() {
        let cell = CellValue::Text("2025-11-05".to_string());
        let expected = NaiveDate::from_ymd_opt(2025, 11, 5)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(Some(expected), cell.as_timestamp());
    }

    #[test]
    fn test_timestamp_from_us_date_text() {
        let cell = CellValue::Text("11/05/2025".to_string());
        assert_eq!(
            Some(
                NaiveDate::from_ymd_opt(2025, 11, 5)
                    .unwrap()
                    .and_time(NaiveTime::MIN)
            ),
            cell.as_timestamp()
        );
    }

    #[test]
    fn test_timestamp_from_datetime_text() {
        let cell = CellValue::Text("2025-11-05 09:30:00".to_string());
        let expected = NaiveDate::from_ymd_opt(2025, 11, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(Some(expected), cell.as_timestamp());
    }

    #[test]
    fn test_timestamp_from_rfc3339_text() {
        let cell = CellValue::Text("2025-11-05T09:30:00+00:00".to_string());
        assert!(cell.as_timestamp().is_some());
    }

    #[test]
    fn test_timestamp_from_garbage_is_none() {
        assert_eq!(None, CellValue::Text("soon".to_string()).as_timestamp());
        assert_eq!(None, CellValue::Int(20251105).as_timestamp());
    }

    #[test]
    fn test_to_text() {
        assert_eq!("", CellValue::Null.to_text());
        assert_eq!("1234567890", CellValue::Int(1234567890).to_text());
        assert_eq!("ok", CellValue::Text("ok".to_string()).to_text());
    }
}
