//! Log-only notification transport.

use async_trait::async_trait;
use tracing::info;

use crate::domain::notifier::{Notifier, NotifyError};

/// Fallback transport used when no relay endpoint is configured.
///
/// Keeps the notification path exercised in development without sending
/// anything anywhere.
#[derive(Default)]
pub struct NullNotifier;

impl NullNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, recipient: &str, code: &str) -> Result<(), NotifyError> {
        info!(recipient, code, "notification suppressed (no relay configured)");
        Ok(())
    }
}
