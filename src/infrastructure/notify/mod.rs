//! Outbound notification transports.

mod http_notifier;
mod null_notifier;

pub use http_notifier::HttpNotifier;
pub use null_notifier::NullNotifier;
