//! HTTP server initialization and runtime setup.
//!
//! Wires the connection pool, migrations, repositories, the notification
//! worker, and the Axum server lifecycle.

use crate::config::Config;
use crate::application::services::{AnalyticsService, AuthService, LinkService, ResolutionService};
use crate::domain::notification_worker::run_notification_worker;
use crate::domain::notifier::Notifier;
use crate::infrastructure::notify::{HttpNotifier, NullNotifier};
use crate::infrastructure::persistence::{
    PgLinkRepository, PgTokenRepository, PgVisitRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Notification transport (HTTP relay or log-only fallback)
/// - Background notification worker
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if the database connection, bind, or serve fails.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let notifier: Arc<dyn Notifier> = match &config.notify_endpoint {
        Some(endpoint) => {
            let timeout = Duration::from_secs(config.notify_timeout_seconds);
            match HttpNotifier::new(endpoint.clone(), timeout) {
                Ok(http) => {
                    tracing::info!("Notifications enabled (HTTP relay)");
                    Arc::new(http)
                }
                Err(e) => {
                    tracing::warn!("Failed to build notifier: {}. Using log-only.", e);
                    Arc::new(NullNotifier::new())
                }
            }
        }
        None => {
            tracing::info!("Notifications log-only (no relay configured)");
            Arc::new(NullNotifier::new())
        }
    };

    let (notify_tx, notify_rx) = mpsc::channel(config.notify_queue_capacity);
    tokio::spawn(run_notification_worker(
        notify_rx,
        notifier,
        Duration::from_secs(config.notify_timeout_seconds),
    ));
    tracing::info!("Notification worker started");

    let pool_arc = Arc::new(pool.clone());
    let link_repository = Arc::new(PgLinkRepository::new(pool_arc.clone()));
    let visit_repository = Arc::new(PgVisitRepository::new(pool_arc.clone()));
    let token_repository = Arc::new(PgTokenRepository::new(pool_arc));

    let state = AppState {
        link_service: Arc::new(LinkService::new(link_repository.clone())),
        resolution_service: Arc::new(ResolutionService::new(
            link_repository.clone(),
            visit_repository.clone(),
            notify_tx.clone(),
        )),
        analytics_service: Arc::new(AnalyticsService::new(link_repository, visit_repository)),
        auth_service: Arc::new(AuthService::new(
            token_repository,
            config.token_signing_secret.clone(),
        )),
        db: pool,
        notify_tx,
        base_url: config.base_url.clone(),
        behind_proxy: config.behind_proxy,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}
