//! Background worker draining the visit-notification queue.
//!
//! Resolution handlers enqueue [`NotificationRequest`]s with `try_send` and
//! move on; this worker owns delivery. A full queue drops the notification
//! (with a counter), a slow transport is cut off by the per-attempt timeout.
//! Nothing here feeds back into resolution outcomes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::notifier::Notifier;

/// One pending "your link was accessed" notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub recipient: String,
    pub code: String,
}

/// Drains the notification queue until all senders are dropped.
///
/// Each delivery attempt is bounded by `attempt_timeout`; failures and
/// timeouts are logged and counted, never retried.
pub async fn run_notification_worker(
    mut rx: mpsc::Receiver<NotificationRequest>,
    notifier: Arc<dyn Notifier>,
    attempt_timeout: Duration,
) {
    while let Some(req) = rx.recv().await {
        match tokio::time::timeout(attempt_timeout, notifier.notify(&req.recipient, &req.code))
            .await
        {
            Ok(Ok(())) => {
                debug!(code = %req.code, "visit notification delivered");
            }
            Ok(Err(e)) => {
                metrics::counter!("notifications_failed").increment(1);
                warn!(code = %req.code, error = %e, "visit notification failed");
            }
            Err(_) => {
                metrics::counter!("notifications_timed_out").increment(1);
                warn!(
                    code = %req.code,
                    timeout_ms = attempt_timeout.as_millis() as u64,
                    "visit notification timed out"
                );
            }
        }
    }
}
