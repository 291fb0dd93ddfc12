//! The S3 implementation of [`ObjectStore`].

use crate::store::ObjectStore;
use crate::{Config, Result};
use anyhow::Context;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;

pub(super) struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub(super) async fn new(config: &Config) -> Self {
        let sdk_config = crate::aws::sdk_config(config.region()).await;
        Self {
            client: Client::new(&sdk_config),
            bucket: config.bucket().to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>> {
        let mut prefixes = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .delimiter("/")
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.with_context(|| format!("Failed to list prefixes under '{prefix}'"))?;
            for common in page.common_prefixes() {
                if let Some(found) = common.prefix() {
                    prefixes.push(found.to_string());
                }
            }
        }
        Ok(prefixes)
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.with_context(|| format!("Failed to list objects under '{prefix}'"))?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("Failed to get object '{key}'"))?;
        let body = response
            .body
            .collect()
            .await
            .with_context(|| format!("Failed to read body of object '{key}'"))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn download_to(&self, key: &str, path: &Path) -> Result<()> {
        let body = self.get(key).await?;
        tokio::fs::write(path, body)
            .await
            .with_context(|| format!("Failed to write '{key}' to {}", path.display()))
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| format!("Failed to put object '{key}'"))?;
        Ok(())
    }
}
