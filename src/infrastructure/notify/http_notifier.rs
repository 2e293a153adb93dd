//! HTTP mail-relay notification transport.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::domain::notifier::{Notifier, NotifyError};

#[derive(Serialize)]
struct NotificationMessage<'a> {
    to: &'a str,
    subject: String,
    text: String,
}

/// Delivers visit notifications by POSTing JSON to a mail-relay endpoint.
///
/// The relay (or any webhook receiver) owns actual email delivery; this
/// transport only hands the message over. The embedded client timeout is a
/// second line of defense behind the worker's per-attempt timeout.
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    /// Creates a transport targeting `endpoint`.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, recipient: &str, code: &str) -> Result<(), NotifyError> {
        let message = NotificationMessage {
            to: recipient,
            subject: "Your link was accessed".to_string(),
            text: format!("Your shortened link ({code}) was just accessed."),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&message)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(format!(
                "relay returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
