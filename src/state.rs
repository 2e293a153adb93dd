//! Shared application state injected into handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::application::services::{AnalyticsService, AuthService, LinkService, ResolutionService};
use crate::domain::notification_worker::NotificationRequest;

/// Application state shared across all request handlers.
///
/// Services are wired over `Arc<dyn …>` repositories, so tests can swap in
/// in-memory stores without touching the handlers.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub resolution_service: Arc<ResolutionService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub auth_service: Arc<AuthService>,
    pub db: PgPool,
    pub notify_tx: mpsc::Sender<NotificationRequest>,
    pub base_url: String,
    pub behind_proxy: bool,
}
