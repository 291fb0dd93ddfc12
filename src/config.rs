//! Configuration file handling for the statements job.
//!
//! The configuration file is a JSON document whose path comes from `--config` or the
//! `STATEMENTS_CONFIG` environment variable. It names the bucket and key layout, toggles the
//! upload and email steps, and sets the branding that appears on rendered statements.

use crate::model::ColumnMap;
use crate::Result;
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_BASE_PATH: &str = "transactions";
const DEFAULT_OUTPUT_PREFIX: &str = "emails-data";
const DEFAULT_BANK_NAME: &str = "Your Bank Name";
const DEFAULT_SUPPORT_CONTACT: &str = "support@yourdomain.com";

/// The `Config` object represents the configuration of the app. Every field except `bucket`
/// has a default, so a minimal config file is `{"bucket": "my-bucket"}`.
///
/// Example configuration:
/// ```json
/// {
///   "bucket": "bank-data-prod",
///   "region": "ap-south-1",
///   "base_path": "transactions",
///   "output_prefix": "emails-data",
///   "sender": "statements@bank.example",
///   "send_via_email": true,
///   "upload_to_store": true,
///   "logo_key": "assets/logo.png",
///   "font_path": "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
///   "bank_name": "Example Bank",
///   "support_contact": "support@bank.example",
///   "columns": {"date": "txn_ts"}
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// The bucket that holds both the partitioned transaction data and the rendered output.
    bucket: String,

    /// AWS region override. When absent the region comes from the ambient AWS environment.
    region: Option<String>,

    /// Prefix of the partitioned transaction data, under which `month=`/`cust_id=` live.
    base_path: String,

    /// Prefix where rendered statements are written.
    output_prefix: String,

    /// Sender address for statement emails. Email sending is disabled while this is empty.
    sender: String,

    /// Whether statements are emailed to customers.
    send_via_email: bool,

    /// Whether protected statements are uploaded back to the bucket.
    upload_to_store: bool,

    /// Object key of a PNG or JPEG logo drawn in the statement header.
    logo_key: Option<String>,

    /// Path to a TTF font used for statement body text instead of the builtin Helvetica.
    font_path: Option<PathBuf>,

    /// Bank name shown in the statement header and the email signature.
    bank_name: String,

    /// Contact address printed in the statement footer.
    support_contact: String,

    /// Source column names, for data sets that deviate from the defaults.
    columns: ColumnMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: None,
            base_path: DEFAULT_BASE_PATH.to_string(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            sender: String::new(),
            send_via_email: true,
            upload_to_store: true,
            logo_key: None,
            font_path: None,
            bank_name: DEFAULT_BANK_NAME.to_string(),
            support_contact: DEFAULT_SUPPORT_CONTACT.to_string(),
            columns: ColumnMap::default(),
        }
    }
}

impl Config {
    /// Loads and validates the config file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if `bucket` is empty.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            !self.bucket.is_empty(),
            "The config file must name a bucket"
        );
        Ok(())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn send_via_email(&self) -> bool {
        self.send_via_email
    }

    pub fn upload_to_store(&self) -> bool {
        self.upload_to_store
    }

    pub fn logo_key(&self) -> Option<&str> {
        self.logo_key.as_deref()
    }

    pub fn font_path(&self) -> Option<&Path> {
        self.font_path.as_deref()
    }

    pub fn bank_name(&self) -> &str {
        &self.bank_name
    }

    pub fn support_contact(&self) -> &str {
        &self.support_contact
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }
}
