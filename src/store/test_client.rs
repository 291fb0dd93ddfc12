//! An implementation of [`ObjectStore`] that holds objects in memory.
//!
//! Note: this is compiled even in the 'production' version of this app so that we can run the
//! whole app, top-to-bottom, without touching AWS.

use crate::store::ObjectStore;
use crate::Result;
use anyhow::{bail, Context};
use parquet::data_type::{ByteArray, ByteArrayType, DoubleType};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// The column layout written by [`TestStore::put_parquet`], matching the default
/// [`ColumnMap`](crate::model::ColumnMap).
const ROW_SCHEMA: &str = "
message statement_row {
    required binary customer_id (UTF8);
    required binary first_name (UTF8);
    required binary email_id (UTF8);
    required binary phone_no (UTF8);
    required binary account_id (UTF8);
    required binary transaction_date (UTF8);
    required binary description (UTF8);
    required double amount;
    required double availablebalance;
}
";

/// One transaction record to seed into a parquet object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedRow {
    pub customer_id: String,
    pub first_name: String,
    pub email_id: String,
    pub phone_no: String,
    pub account_id: String,
    pub transaction_date: String,
    pub description: String,
    pub amount: f64,
    pub availablebalance: f64,
}

struct StoredObject {
    body: Vec<u8>,
    content_type: String,
}

/// An in-memory object store. Keys behave like S3 keys, so prefix listing with a `/`
/// delimiter works the same way it does against a bucket.
#[derive(Default)]
pub struct TestStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    fail_puts: AtomicBool,
}

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with two customers' worth of transaction data for 2025-11. One of
    /// the customers has a phone number too short to derive a password from.
    pub fn with_sample_data() -> Result<Self> {
        let store = Self::new();
        store.put_parquet(
            "transactions/month=2025-11/cust_id=C100/part-0000.parquet",
            &sample_rows(
                "C100",
                "Asha",
                "asha@example.com",
                "9876543210",
                "ACC-1001",
                &[
                    ("2025-11-03", "Salary Credit", 45000.0, 61250.0),
                    ("2025-11-09", "Utility Bill", -1850.0, 59400.0),
                    ("2025-11-21", "Grocery Store", -2400.0, 57000.0),
                ],
            ),
        )?;
        store.put_parquet(
            "transactions/month=2025-11/cust_id=C200/part-0000.parquet",
            &sample_rows(
                "C200",
                "Ravi",
                "ravi@example.com",
                "555",
                "ACC-1002",
                &[
                    ("2025-11-05", "Interest Credit", 320.0, 8320.0),
                    ("2025-11-18", "ATM Withdrawal", -2000.0, 6320.0),
                ],
            ),
        )?;
        Ok(store)
    }

    /// Stores an object without going through the [`ObjectStore`] trait, so tests can seed
    /// data regardless of the `fail_puts` setting.
    pub fn insert(&self, key: impl Into<String>, body: Vec<u8>, content_type: impl Into<String>) {
        self.objects().insert(
            key.into(),
            StoredObject {
                body,
                content_type: content_type.into(),
            },
        );
    }

    /// Encodes `rows` as a parquet file and stores it at `key`.
    pub fn put_parquet(&self, key: impl Into<String>, rows: &[SeedRow]) -> Result<()> {
        let body = write_rows(rows)?;
        self.insert(key, body, "application/octet-stream");
        Ok(())
    }

    /// The body of the object at `key`, if present.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects().get(key).map(|object| object.body.clone())
    }

    /// The content type of the object at `key`, if present.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects()
            .get(key)
            .map(|object| object.content_type.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    /// When set, every call to [`ObjectStore::put`] fails.
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, StoredObject>> {
        match self.objects.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for TestStore {
    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>> {
        let objects = self.objects();
        let mut found = BTreeSet::new();
        for key in objects.keys() {
            if let Some(rest) = key.strip_prefix(prefix) {
                if let Some(position) = rest.find('/') {
                    found.insert(format!("{prefix}{}", &rest[..=position]));
                }
            }
        }
        Ok(found.into_iter().collect())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .objects()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.object(key)
            .with_context(|| format!("No object at '{key}'"))
    }

    async fn download_to(&self, key: &str, path: &Path) -> Result<()> {
        let body = self.get(key).await?;
        tokio::fs::write(path, body)
            .await
            .with_context(|| format!("Failed to write '{key}' to {}", path.display()))
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            bail!("Simulated put failure for '{key}'");
        }
        self.insert(key, body, content_type);
        Ok(())
    }
}

fn sample_rows(
    customer_id: &str,
    first_name: &str,
    email_id: &str,
    phone_no: &str,
    account_id: &str,
    transactions: &[(&str, &str, f64, f64)],
) -> Vec<SeedRow> {
    transactions
        .iter()
        .map(
            |&(transaction_date, description, amount, availablebalance)| SeedRow {
                customer_id: customer_id.to_string(),
                first_name: first_name.to_string(),
                email_id: email_id.to_string(),
                phone_no: phone_no.to_string(),
                account_id: account_id.to_string(),
                transaction_date: transaction_date.to_string(),
                description: description.to_string(),
                amount,
                availablebalance,
            },
        )
        .collect()
}

fn text_field(row: &SeedRow, index: usize) -> &str {
    match index {
        0 => &row.customer_id,
        1 => &row.first_name,
        2 => &row.email_id,
        3 => &row.phone_no,
        4 => &row.account_id,
        5 => &row.transaction_date,
        _ => &row.description,
    }
}

fn write_rows(rows: &[SeedRow]) -> Result<Vec<u8>> {
    let schema = Arc::new(parse_message_type(ROW_SCHEMA).context("Bad seed row schema")?);
    let properties = Arc::new(WriterProperties::builder().build());
    let mut writer = SerializedFileWriter::new(Vec::new(), schema, properties)
        .context("Failed to start parquet writer")?;
    let mut row_group = writer.next_row_group().context("Failed to start row group")?;
    let mut index = 0;
    while let Some(mut column) = row_group.next_column()? {
        match index {
            0..=6 => {
                let values: Vec<ByteArray> = rows
                    .iter()
                    .map(|row| ByteArray::from(text_field(row, index)))
                    .collect();
                column
                    .typed::<ByteArrayType>()
                    .write_batch(&values, None, None)?;
            }
            7 => {
                let values: Vec<f64> = rows.iter().map(|row| row.amount).collect();
                column
                    .typed::<DoubleType>()
                    .write_batch(&values, None, None)?;
            }
            _ => {
                let values: Vec<f64> = rows.iter().map(|row| row.availablebalance).collect();
                column
                    .typed::<DoubleType>()
                    .write_batch(&values, None, None)?;
            }
        }
        column.close()?;
        index += 1;
    }
    row_group.close()?;
    writer.into_inner().context("Failed to finish parquet file")
}
