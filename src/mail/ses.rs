//! The SES implementation of [`Mailer`].

use crate::mail::Mailer;
use crate::{Config, Result};
use anyhow::Context;
use aws_sdk_sesv2::primitives::Blob;
use aws_sdk_sesv2::types::{Destination, EmailContent, RawMessage};
use aws_sdk_sesv2::Client;

pub(super) struct SesMailer {
    client: Client,
    sender: String,
}

impl SesMailer {
    pub(super) async fn new(config: &Config) -> Self {
        let sdk_config = crate::aws::sdk_config(config.region()).await;
        Self {
            client: Client::new(&sdk_config),
            sender: config.sender().to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Mailer for SesMailer {
    async fn send_raw(&self, to: &str, raw: Vec<u8>) -> Result<String> {
        let message = RawMessage::builder()
            .data(Blob::new(raw))
            .build()
            .context("Failed to build raw message")?;
        let content = EmailContent::builder().raw(message).build();
        let destination = Destination::builder().to_addresses(to).build();
        let response = self
            .client
            .send_email()
            .from_email_address(&self.sender)
            .destination(destination)
            .content(content)
            .send()
            .await
            .with_context(|| format!("Failed to send email to '{to}'"))?;
        Ok(response.message_id().unwrap_or_default().to_string())
    }
}
