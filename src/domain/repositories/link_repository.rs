//! Repository trait for link storage.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage interface for access-gated links.
///
/// The resolution engine never holds link state across requests: it reads a
/// snapshot, decides, and issues commands. `register_visit` is the one command
/// with a concurrency contract — see its documentation.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists.
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on store errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if no link carries this code
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on store
    /// errors — never `Ok(None)` for an unreachable store.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Atomically commits one visit against the link's quota.
    ///
    /// In a single conditional update: increments `current_clicks` and
    /// `visits` and sets `last_visited_at = now`, but only while
    /// `current_clicks` is still below `click_limit` (links without a limit
    /// always qualify). Returns `false` when the guard fails, meaning a
    /// concurrent resolution took the last quota slot. Implementations must
    /// not use a read-then-write sequence here.
    async fn register_visit(&self, link_id: i64, now: DateTime<Utc>) -> Result<bool, AppError>;

    /// Lists a user's links, newest first.
    async fn list_by_owner(
        &self,
        owner_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, AppError>;

    /// Counts a user's links, for pagination metadata.
    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, AppError>;
}
