//! Uploads protected statements and emails them to customers.

use crate::mail::Mailer;
use crate::model::{CustomerMetadata, Period};
use crate::store::ObjectStore;
use crate::{Config, Result, StageError};
use anyhow::Context;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message, MultiPart, SinglePart};

const NAME_FALLBACK: &str = "Customer";

pub(crate) fn statement_filename(customer: &str, period: Period) -> String {
    format!("{customer}_statement_{period}.pdf")
}

pub(crate) fn output_key(output_prefix: &str, customer: &str, period: Period) -> String {
    format!(
        "{output_prefix}/month={period}/{}",
        statement_filename(customer, period)
    )
}

/// Writes the protected statement to the output prefix, replacing any earlier run's copy,
/// and returns the object's location.
pub(crate) async fn upload(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    pdf: Vec<u8>,
) -> Result<String, StageError> {
    store
        .put(key, pdf, "application/pdf")
        .await
        .map_err(|source| StageError::Sink {
            key: key.to_string(),
            source,
        })?;
    Ok(format!("s3://{bucket}/{key}"))
}

/// How [`deliver`] disposed of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DeliveryOutcome {
    /// The statement was emailed.
    Sent { message_id: String },
    /// No mailer is configured; nothing was sent.
    NotConfigured,
    /// The customer has no usable email address; nothing was sent.
    NoRecipient,
}

/// Emails the protected statement to the customer. The password is never included; it is
/// communicated out of band.
pub(crate) async fn deliver(
    mailer: Option<&dyn Mailer>,
    config: &Config,
    period: Period,
    customer: &str,
    metadata: &CustomerMetadata,
    pdf: Vec<u8>,
) -> Result<DeliveryOutcome, StageError> {
    let Some(mailer) = mailer else {
        return Ok(DeliveryOutcome::NotConfigured);
    };
    let recipient = metadata.email().trim();
    if !recipient.contains('@') {
        return Ok(DeliveryOutcome::NoRecipient);
    }
    let delivery_error = |source| StageError::Delivery {
        customer: customer.to_string(),
        source,
    };
    let subject = format!("Your Monthly Bank Statement - {period}");
    let body = message_body(metadata.name(), config.bank_name());
    let filename = statement_filename(customer, period);
    let raw = build_message(config.sender(), recipient, &subject, body, &filename, pdf)
        .map_err(delivery_error)?;
    let message_id = mailer
        .send_raw(recipient, raw)
        .await
        .map_err(delivery_error)?;
    Ok(DeliveryOutcome::Sent { message_id })
}

fn message_body(name: &str, bank_name: &str) -> String {
    let name = name.trim();
    let name = if name.is_empty() { NAME_FALLBACK } else { name };
    format!(
        "Dear {name},\n\n\
        Please find attached your password-protected monthly bank statement.\n\
        For security, the password has been sent separately.\n\n\
        Regards,\n\
        {bank_name}"
    )
}

fn build_message(
    sender: &str,
    recipient: &str,
    subject: &str,
    body: String,
    filename: &str,
    pdf: Vec<u8>,
) -> Result<Vec<u8>> {
    let from: Mailbox = sender
        .parse()
        .with_context(|| format!("Invalid sender address '{sender}'"))?;
    let to: Mailbox = recipient
        .parse()
        .with_context(|| format!("Invalid recipient address '{recipient}'"))?;
    let content_type = ContentType::parse("application/pdf").context("Bad attachment type")?;
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body))
                .singlepart(Attachment::new(filename.to_string()).body(pdf, content_type)),
        )
        .context("Failed to build the statement email")?;
    Ok(message.formatted())
}
