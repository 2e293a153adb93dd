//! Outbound notification port.

use async_trait::async_trait;

/// Errors from a notification transport.
///
/// These never propagate past the notification worker; they exist so the
/// worker can log and count failures with some shape.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport error: {0}")]
    Transport(String),
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Delivery interface for visit notifications.
///
/// Best-effort by contract: a failed delivery must never affect the
/// resolution that triggered it.
///
/// # Implementations
///
/// - [`crate::infrastructure::notify::HttpNotifier`] - HTTP mail-relay transport
/// - [`crate::infrastructure::notify::NullNotifier`] - log-only fallback
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notifies `recipient` that the link behind `code` was accessed.
    async fn notify(&self, recipient: &str, code: &str) -> Result<(), NotifyError>;
}
