//! Object storage access for transaction data and rendered statements.

use crate::{Config, Result};
use std::path::Path;
use std::sync::Arc;

mod s3;
mod test_client;

use s3::S3Store;
pub use test_client::{SeedRow, TestStore};

/// Name of the environment variable that switches the app to in-memory clients.
pub const IN_TEST_MODE: &str = "STATEMENTS_IN_TEST_MODE";

/// Chooses between real AWS clients and in-memory test clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Aws,
    Test,
}

impl Mode {
    /// Reads the mode from the environment. When `STATEMENTS_IN_TEST_MODE` is set and
    /// non-zero in length the mode is `Test`, otherwise `Aws`.
    pub fn from_env() -> Self {
        match std::env::var(IN_TEST_MODE) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Aws,
        }
    }
}

/// Operations the pipeline needs from object storage. `S3Store` implements this against a
/// bucket; `TestStore` implements it in memory.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists the distinct "directories" directly under `prefix`, i.e. common prefixes up to
    /// the next `/`. Each returned value ends with `/`.
    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>>;

    /// Lists the keys of all objects under `prefix`.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>>;

    /// Reads the full body of the object at `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Downloads the object at `key` to a local file.
    async fn download_to(&self, key: &str, path: &Path) -> Result<()>;

    /// Writes `body` to `key`, replacing any existing object.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;
}

/// Creates the object store for the given mode. `Test` mode returns a store pre-seeded with
/// sample transaction data so the whole app can run without AWS.
pub async fn client(config: &Config, mode: Mode) -> Result<Arc<dyn ObjectStore>> {
    match mode {
        Mode::Aws => Ok(Arc::new(S3Store::new(config).await)),
        Mode::Test => Ok(Arc::new(TestStore::with_sample_data()?)),
    }
}
