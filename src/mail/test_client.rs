//! An implementation of [`Mailer`] that collects messages in memory.
//!
//! Note: this is compiled even in the 'production' version of this app so that we can run the
//! whole app, top-to-bottom, without touching AWS.

use crate::mail::Mailer;
use crate::Result;
use std::sync::{Mutex, MutexGuard};

/// A message captured by [`TestMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub raw: Vec<u8>,
}

/// An in-memory mailer. Every message is accepted and recorded.
#[derive(Debug, Default)]
pub struct TestMailer {
    sent: Mutex<Vec<SentMessage>>,
}

impl TestMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The messages sent so far, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.messages().clone()
    }

    fn messages(&self) -> MutexGuard<'_, Vec<SentMessage>> {
        match self.sent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait::async_trait]
impl Mailer for TestMailer {
    async fn send_raw(&self, to: &str, raw: Vec<u8>) -> Result<String> {
        let mut messages = self.messages();
        messages.push(SentMessage {
            to: to.to_string(),
            raw,
        });
        Ok(format!("test-message-{}", messages.len()))
    }
}
