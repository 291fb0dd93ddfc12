//! Locates partitioned transaction data in the object store.
//!
//! Data files live under `{base_path}/month={period}/cust_id={customer}/` and customers are
//! discovered by listing the `cust_id=` partitions of a month.

use crate::model::Period;
use crate::store::ObjectStore;
use crate::Result;
use anyhow::Context;
use std::collections::BTreeSet;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub(crate) struct RecordStore {
    store: Arc<dyn ObjectStore>,
    base_path: String,
}

impl RecordStore {
    pub(crate) fn new(store: Arc<dyn ObjectStore>, base_path: impl Into<String>) -> Self {
        Self {
            store,
            base_path: base_path.into(),
        }
    }

    fn month_prefix(&self, period: Period) -> String {
        format!("{}/month={}/", self.base_path, period)
    }

    /// The customer ids that have a data partition for `period`, sorted and deduplicated.
    pub(crate) async fn list_customers(&self, period: Period) -> Result<Vec<String>> {
        let prefix = self.month_prefix(period);
        let prefixes = self.store.list_prefixes(&prefix).await?;
        let customers: BTreeSet<String> = prefixes
            .iter()
            .filter_map(|prefix| customer_from_prefix(prefix))
            .collect();
        Ok(customers.into_iter().collect())
    }

    /// The parquet object keys for one customer partition. Non-parquet objects, like Spark's
    /// `_SUCCESS` markers, are ignored.
    pub(crate) async fn list_data_files(
        &self,
        period: Period,
        customer: &str,
    ) -> Result<Vec<String>> {
        let prefix = format!("{}cust_id={customer}/", self.month_prefix(period));
        let keys = self.store.list_objects(&prefix).await?;
        Ok(keys
            .into_iter()
            .filter(|key| key.to_lowercase().ends_with(".parquet"))
            .collect())
    }

    /// Downloads the object at `key` to a scratch file. The file is deleted when the returned
    /// handle drops.
    pub(crate) async fn fetch(&self, key: &str) -> Result<NamedTempFile> {
        let scratch = NamedTempFile::new().context("Failed to create scratch file")?;
        self.store.download_to(key, scratch.path()).await?;
        Ok(scratch)
    }
}

/// Extracts the customer id from a partition prefix like `.../cust_id=C100/`.
fn customer_from_prefix(prefix: &str) -> Option<String> {
    let segment = prefix.trim_end_matches('/').rsplit('/').next()?;
    let customer = segment.strip_prefix("cust_id=")?;
    if customer.is_empty() {
        None
    } else {
        Some(customer.to_string())
    }
}
