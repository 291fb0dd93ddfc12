//! Reads parquet data files into [`CellValue`] rows.

use crate::model::CellValue;
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Duration, NaiveTime};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Reads every row of the parquet file at `path`. Column names keep their source casing
/// here; [`TransactionTable::push`](crate::model::TransactionTable::push) lowercases them.
pub(crate) fn read_table_file(path: &Path) -> Result<Vec<BTreeMap<String, CellValue>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open data file at {}", path.display()))?;
    let reader = SerializedFileReader::new(file)
        .with_context(|| format!("Failed to read parquet file at {}", path.display()))?;
    let mut rows = Vec::new();
    for row in reader.get_row_iter(None).context("Bad parquet schema")? {
        let row = row.context("Failed to read parquet row")?;
        let cells: BTreeMap<String, CellValue> = row
            .get_column_iter()
            .map(|(name, field)| (name.clone(), field_to_cell(field)))
            .collect();
        rows.push(cells);
    }
    Ok(rows)
}

fn field_to_cell(field: &Field) -> CellValue {
    match field {
        Field::Null => CellValue::Null,
        Field::Bool(value) => CellValue::Bool(*value),
        Field::Byte(value) => CellValue::Int(i64::from(*value)),
        Field::Short(value) => CellValue::Int(i64::from(*value)),
        Field::Int(value) => CellValue::Int(i64::from(*value)),
        Field::Long(value) => CellValue::Int(*value),
        Field::UByte(value) => CellValue::Int(i64::from(*value)),
        Field::UShort(value) => CellValue::Int(i64::from(*value)),
        Field::UInt(value) => CellValue::Int(i64::from(*value)),
        Field::ULong(value) => match i64::try_from(*value) {
            Ok(value) => CellValue::Int(value),
            Err(_) => CellValue::Text(value.to_string()),
        },
        Field::Float(value) => CellValue::Float(f64::from(*value)),
        Field::Double(value) => CellValue::Float(*value),
        Field::Str(value) => CellValue::Text(value.clone()),
        Field::Bytes(value) => CellValue::Text(String::from_utf8_lossy(value.data()).to_string()),
        Field::Date(days) => date_from_days(*days),
        Field::TimestampMillis(millis) => DateTime::from_timestamp_millis(*millis)
            .map(|ts| CellValue::Timestamp(ts.naive_utc()))
            .unwrap_or(CellValue::Null),
        Field::TimestampMicros(micros) => DateTime::from_timestamp_micros(*micros)
            .map(|ts| CellValue::Timestamp(ts.naive_utc()))
            .unwrap_or(CellValue::Null),
        other => CellValue::Text(other.to_string()),
    }
}

/// Parquet dates are days since the Unix epoch.
fn date_from_days(days: i32) -> CellValue {
    DateTime::UNIX_EPOCH
        .date_naive()
        .checked_add_signed(Duration::days(i64::from(days)))
        .map(|date| CellValue::Timestamp(date.and_time(NaiveTime::MIN)))
        .unwrap_or(CellValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SeedRow, TestStore};
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn seeded_file() -> NamedTempFile {
        let store = TestStore::new();
        store
            .put_parquet(
                "k",
                &[SeedRow {
                    customer_id: "C1".to_string(),
                    first_name: "Priya".to_string(),
                    email_id: "priya@example.com".to_string(),
                    phone_no: "1234567890".to_string(),
                    account_id: "ACC-77".to_string(),
                    transaction_date: "2025-11-05".to_string(),
                    description: "Salary Credit".to_string(),
                    amount: 500.0,
                    availablebalance: 1500.0,
                }],
            )
            .unwrap();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&store.object("k").unwrap()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_rows() {
        let file = seeded_file();

        let rows = read_table_file(file.path()).unwrap();

        assert_eq!(1, rows.len());
        let row = &rows[0];
        assert_eq!(
            Some(&CellValue::Text("Priya".to_string())),
            row.get("first_name")
        );
        assert_eq!(Some(&CellValue::Float(500.0)), row.get("amount"));
        assert_eq!(Some(&CellValue::Float(1500.0)), row.get("availablebalance"));
        assert_eq!(
            Some(&CellValue::Text("2025-11-05".to_string())),
            row.get("transaction_date")
        );
    }

    #[test]
    fn test_read_garbage_fails() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"this is not parquet").unwrap();
        file.flush().unwrap();

        assert!(read_table_file(file.path()).is_err());
    }

    #[test]
    fn test_date_from_days() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 5)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(CellValue::Timestamp(expected), date_from_days(20397));
        assert_eq!(
            CellValue::Timestamp(
                NaiveDate::from_ymd_opt(1970, 1, 1)
                    .unwrap()
                    .and_time(NaiveTime::MIN)
            ),
            date_from_days(0)
        );
    }

    #[test]
    fn test_field_to_cell_integers() {
        assert_eq!(CellValue::Int(7), field_to_cell(&Field::Int(7)));
        assert_eq!(CellValue::Int(7), field_to_cell(&Field::Long(7)));
        assert_eq!(
            CellValue::Text(u64::MAX.to_string()),
            field_to_cell(&Field::ULong(u64::MAX))
        );
    }
}
