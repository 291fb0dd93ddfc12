//! Password protection for rendered statements.

use crate::model::CustomerMetadata;
use crate::Result;
use anyhow::Context;
use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};
use lopdf::{Document, Object, StringFormat};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// The statement password: the last four characters of the customer's phone number, or of
/// the customer id when the phone number is shorter than four characters.
pub(crate) fn derive_password(metadata: &CustomerMetadata, customer_id: &str) -> String {
    let phone = metadata.phone().trim();
    if phone.chars().count() >= 4 {
        last_four(phone)
    } else {
        last_four(customer_id.trim())
    }
}

fn last_four(text: &str) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(4)).collect()
}

/// Encrypts `pdf` so that opening it requires `password`. The owner and user passwords are
/// the same; customers get full permissions on their own statements.
pub(crate) fn protect(pdf: &[u8], password: &str) -> Result<Vec<u8>> {
    let mut document = Document::load_mem(pdf).context("Failed to load the rendered PDF")?;
    ensure_file_id(&mut document, pdf);
    let version = EncryptionVersion::V1 {
        document: &document,
        owner_password: password,
        user_password: password,
        permissions: Permissions::all(),
    };
    let state =
        EncryptionState::try_from(version).context("Failed to derive the encryption key")?;
    document
        .encrypt(&state)
        .context("Failed to encrypt the statement")?;
    let mut out = Vec::new();
    document
        .save_to(&mut out)
        .context("Failed to serialize the protected statement")?;
    Ok(out)
}

/// Encryption key derivation reads the file identifier from the trailer, which some
/// producers omit. Hash the raw bytes into one when it is missing.
fn ensure_file_id(document: &mut Document, pdf: &[u8]) {
    if document.trailer.has(b"ID") {
        return;
    }
    let mut hasher = DefaultHasher::new();
    pdf.hash(&mut hasher);
    let digest = hasher.finish();
    let mut id = digest.to_be_bytes().to_vec();
    id.extend_from_slice(&digest.to_le_bytes());
    document.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone(), StringFormat::Hexadecimal),
            Object::String(id, StringFormat::Hexadecimal),
        ]),
    );
}
