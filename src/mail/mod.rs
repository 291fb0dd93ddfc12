//! Email delivery for rendered statements.

use crate::store::Mode;
use crate::{Config, Result};
use std::sync::Arc;
use tracing::debug;

mod ses;
mod test_client;

use ses::SesMailer;
pub use test_client::{SentMessage, TestMailer};

/// Sends pre-built MIME messages. `SesMailer` implements this against SES; `TestMailer`
/// collects messages in memory.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Sends a raw MIME message to `to` and returns the provider's message id.
    async fn send_raw(&self, to: &str, raw: Vec<u8>) -> Result<String>;
}

/// Creates the mailer for the given mode, or `None` when email sending is disabled. Sending
/// is disabled by the `send_via_email` toggle, or by an empty `sender` since SES refuses
/// messages without a verified sender.
pub async fn client(config: &Config, mode: Mode) -> Result<Option<Arc<dyn Mailer>>> {
    if !config.send_via_email() {
        debug!("Email sending is disabled by config");
        return Ok(None);
    }
    if config.sender().is_empty() {
        debug!("Email sending is disabled because no sender is configured");
        return Ok(None);
    }
    match mode {
        Mode::Aws => Ok(Some(Arc::new(SesMailer::new(config).await))),
        Mode::Test => Ok(Some(Arc::new(TestMailer::new()))),
    }
}
