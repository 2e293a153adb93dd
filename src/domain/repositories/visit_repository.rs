//! Repository trait for the append-only visit log.

use crate::domain::entities::{NewVisit, Visit};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage interface for visit records.
///
/// Appends happen on the resolution write path; everything else serves the
/// read-only analytics aggregator. Visit rows are never updated or deleted.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgVisitRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Appends one visit entry.
    ///
    /// The store assigns id and timestamp. Appends for different resolutions
    /// may interleave freely; there is no ordering requirement between them.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on store errors.
    async fn append(&self, new_visit: NewVisit) -> Result<Visit, AppError>;

    /// Returns the most recent visits for a link, newest first.
    async fn recent(&self, link_id: i64, limit: i64) -> Result<Vec<Visit>, AppError>;

    /// Counts distinct visitors keyed by the (ip, user_agent) pair.
    async fn count_distinct_clients(&self, link_id: i64) -> Result<i64, AppError>;

    /// Returns the distinct non-null emails that have accessed the link.
    ///
    /// Serves both the unique-visitors-by-email metric and the
    /// per-allowed-email access status.
    async fn distinct_emails(&self, link_id: i64) -> Result<Vec<String>, AppError>;
}
