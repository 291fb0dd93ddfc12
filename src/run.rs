//! The batch run: enumerate customers for a billing period, then render, protect, upload and
//! email one statement per customer.
//!
//! Customers are isolated from each other. A failure while rendering or protecting one
//! customer's statement marks that customer failed and the run moves on; upload and email
//! failures are logged and the remaining steps for the customer still happen. Only a failure
//! to enumerate customers aborts the run.

use crate::distribute::DeliveryOutcome;
use crate::mail::Mailer;
use crate::model::{CustomerMetadata, Period};
use crate::records::RecordStore;
use crate::store::ObjectStore;
use crate::{aggregate, distribute, protect, render, Config, Result, StageError};
use anyhow::Context;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Runs the whole pipeline for one billing period.
pub async fn process_period(
    config: &Config,
    store: Arc<dyn ObjectStore>,
    mailer: Option<Arc<dyn Mailer>>,
    period: Period,
) -> Result<RunReport> {
    info!("Processing statements for {period}");
    let records = RecordStore::new(Arc::clone(&store), config.base_path());
    let logo = fetch_logo(config, store.as_ref()).await;
    let customers = records
        .list_customers(period)
        .await
        .with_context(|| format!("Failed to enumerate customers for {period}"))?;
    info!("Found {} customer(s) for {period}", customers.len());

    let mut report = RunReport::new(period, customers.len());
    for customer in &customers {
        let outcome = process_customer(
            config,
            &records,
            store.as_ref(),
            mailer.as_deref(),
            period,
            customer,
            logo.as_deref(),
        )
        .await;
        match outcome {
            Ok(CustomerOutcome::Skipped) => {
                info!("Customer '{customer}' has no data for {period}, skipping");
                report.skipped += 1;
            }
            Ok(CustomerOutcome::Processed { uploaded, emailed }) => {
                report.rendered += 1;
                if uploaded {
                    report.uploaded += 1;
                }
                if emailed {
                    report.emailed += 1;
                }
            }
            Err(e) => {
                error!("{e}");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

enum CustomerOutcome {
    Skipped,
    Processed { uploaded: bool, emailed: bool },
}

async fn process_customer(
    config: &Config,
    records: &RecordStore,
    store: &dyn ObjectStore,
    mailer: Option<&dyn Mailer>,
    period: Period,
    customer: &str,
    logo: Option<&[u8]>,
) -> Result<CustomerOutcome, StageError> {
    let table = aggregate::assemble(records, config.columns(), period, customer).await;
    if table.is_empty() {
        return Ok(CustomerOutcome::Skipped);
    }
    debug!(
        "Rendering statement for customer '{customer}' with {} transaction(s)",
        table.len()
    );
    let metadata = CustomerMetadata::from_table(&table);
    let pdf = render::render(config, period, &metadata, &table, logo).map_err(|source| {
        StageError::Render {
            customer: customer.to_string(),
            source,
        }
    })?;
    let password = protect::derive_password(&metadata, customer);
    let protected = protect::protect(&pdf, &password).map_err(|source| StageError::Document {
        customer: customer.to_string(),
        source,
    })?;

    let mut uploaded = false;
    if config.upload_to_store() {
        let key = distribute::output_key(config.output_prefix(), customer, period);
        match distribute::upload(store, config.bucket(), &key, protected.clone()).await {
            Ok(location) => {
                info!("Uploaded statement for customer '{customer}' to {location}");
                uploaded = true;
            }
            Err(e) => warn!("{e}"),
        }
    }

    let mut emailed = false;
    match distribute::deliver(mailer, config, period, customer, &metadata, protected).await {
        Ok(DeliveryOutcome::Sent { message_id }) => {
            info!("Emailed statement for customer '{customer}', message id '{message_id}'");
            emailed = true;
        }
        Ok(DeliveryOutcome::NotConfigured) => {
            debug!("Email sending is not configured, statement for customer '{customer}' not sent");
        }
        Ok(DeliveryOutcome::NoRecipient) => {
            warn!("Customer '{customer}' has no usable email address, skipping email");
        }
        Err(e) => warn!("{e}"),
    }

    Ok(CustomerOutcome::Processed { uploaded, emailed })
}

async fn fetch_logo(config: &Config, store: &dyn ObjectStore) -> Option<Vec<u8>> {
    let key = config.logo_key()?;
    match store.get(key).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("Proceeding without the statement logo: {e:#}");
            None
        }
    }
}

/// Counts from one run of [`process_period`].
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    period: Period,
    customers: usize,
    rendered: usize,
    uploaded: usize,
    emailed: usize,
    skipped: usize,
    failed: usize,
}

impl RunReport {
    fn new(period: Period, customers: usize) -> Self {
        Self {
            period,
            customers,
            rendered: 0,
            uploaded: 0,
            emailed: 0,
            skipped: 0,
            failed: 0,
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn customers(&self) -> usize {
        self.customers
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn uploaded(&self) -> usize {
        self.uploaded
    }

    pub fn emailed(&self) -> usize {
        self.emailed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Logs the report, with the full JSON at debug level.
    pub fn print(&self) {
        info!("{self}");
        match serde_json::to_string_pretty(self) {
            Ok(json) => debug!("Run report:\n{json}"),
            Err(e) => debug!("Unable to serialize the run report: {e}"),
        }
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Processed {} customers for {}: {} statements rendered, {} uploaded, {} emailed, \
            {} skipped (no data), {} failed",
            self.customers,
            self.period,
            self.rendered,
            self.uploaded,
            self.emailed,
            self.skipped,
            self.failed
        )
    }
}
