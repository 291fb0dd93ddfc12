//! Assembles one customer's transactions for a billing period.

use crate::model::{CellValue, ColumnMap, Period, TransactionTable};
use crate::reader;
use crate::records::RecordStore;
use crate::{Error, StageError};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Builds the transaction table for `customer`, concatenating every data file in the
/// customer's partition and sorting by transaction date.
///
/// A data file that cannot be fetched or parsed is skipped with a warning; the statement is
/// still produced from whatever loaded. A listing failure is treated the same way and yields
/// an empty table, which the caller skips.
pub(crate) async fn assemble(
    records: &RecordStore,
    columns: &ColumnMap,
    period: Period,
    customer: &str,
) -> TransactionTable {
    let mut table = TransactionTable::new(columns.clone());
    let keys = match records.list_data_files(period, customer).await {
        Ok(keys) => keys,
        Err(e) => {
            warn!("Failed to list data files for customer '{customer}': {e:#}");
            return table;
        }
    };
    debug!(
        "Customer '{customer}' has {} data file(s) for {period}",
        keys.len()
    );
    for key in keys {
        match load_data_file(records, &key).await {
            Ok(rows) => {
                for cells in rows {
                    table.push(cells);
                }
            }
            Err(e) => warn!("Skipping data file: {e}"),
        }
    }
    table.sort_by_date();
    table
}

async fn load_data_file(
    records: &RecordStore,
    key: &str,
) -> Result<Vec<BTreeMap<String, CellValue>>, StageError> {
    let scratch = records.fetch(key).await.map_err(|source| StageError::Fetch {
        key: key.to_string(),
        source,
    })?;
    reader::read_table_file(scratch.path()).map_err(|source: Error| StageError::Parse {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SeedRow, TestStore};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn seed_row(date: &str, description: &str, amount: f64) -> SeedRow {
        SeedRow {
            customer_id: "C1".to_string(),
            first_name: "Priya".to_string(),
            email_id: "priya@example.com".to_string(),
            phone_no: "1234567890".to_string(),
            account_id: "ACC-77".to_string(),
            transaction_date: date.to_string(),
            description: description.to_string(),
            amount,
            availablebalance: 0.0,
        }
    }

    #[tokio::test]
    async fn test_assemble_concatenates_and_sorts() {
        let store = TestStore::new();
        store
            .put_parquet(
                "transactions/month=2025-11/cust_id=C1/part-0001.parquet",
                &[seed_row("2025-11-20", "Later", -1.0)],
            )
            .unwrap();
        store
            .put_parquet(
                "transactions/month=2025-11/cust_id=C1/part-0000.parquet",
                &[seed_row("2025-11-05", "Earlier", 1.0)],
            )
            .unwrap();
        let records = RecordStore::new(Arc::new(store), "transactions");
        let period = "2025-11".parse().unwrap();

        let table = assemble(&records, &ColumnMap::default(), period, "C1").await;

        assert_eq!(2, table.len());
        assert_eq!("Earlier", table.rows()[0].text("description"));
        assert_eq!("Later", table.rows()[1].text("description"));
    }

    #[tokio::test]
    async fn test_assemble_skips_bad_files() {
        let store = TestStore::new();
        store
            .put_parquet(
                "transactions/month=2025-11/cust_id=C1/part-0000.parquet",
                &[seed_row("2025-11-05", "Good", 10.0)],
            )
            .unwrap();
        store.insert(
            "transactions/month=2025-11/cust_id=C1/part-0001.parquet",
            b"corrupt".to_vec(),
            "x",
        );
        let records = RecordStore::new(Arc::new(store), "transactions");
        let period = "2025-11".parse().unwrap();

        let table = assemble(&records, &ColumnMap::default(), period, "C1").await;

        assert_eq!(1, table.len());
        assert_eq!(
            Some(Decimal::from(10)),
            table.rows()[0].decimal("amount")
        );
    }

    #[tokio::test]
    async fn test_assemble_with_no_data_is_empty() {
        let records = RecordStore::new(Arc::new(TestStore::new()), "transactions");
        let period = "2025-11".parse().unwrap();

        let table = assemble(&records, &ColumnMap::default(), period, "C1").await;

        assert!(table.is_empty());
    }
}
