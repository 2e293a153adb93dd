//! Visit analytics aggregation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::entities::Visit;
use crate::domain::repositories::{CurrentUser, LinkRepository, VisitRepository};
use crate::error::AppError;

/// How many recent visits a full summary carries.
const RECENT_VISITS: i64 = 10;

/// Access status for one allow-listed email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAccess {
    pub email: String,
    pub accessed: bool,
}

/// Full per-link analytics, owner-only.
///
/// Both unique-visitor metrics are always present: callers pick the keying
/// that fits their access model instead of the aggregator guessing.
#[derive(Debug, Clone)]
pub struct VisitSummary {
    pub total_visits: i64,
    pub unique_visitors_by_client: i64,
    pub unique_visitors_by_email: i64,
    pub click_limit: Option<i64>,
    pub current_clicks: i64,
    pub last_visited_at: Option<DateTime<Utc>>,
    pub recent_visits: Vec<Visit>,
    pub allowed_emails: Vec<EmailAccess>,
}

/// What a viewer is allowed to see about a link's traffic.
///
/// The authorization boundary sits in front of aggregation: a viewer who does
/// not own the link gets `Limited` and the detailed queries never run.
#[derive(Debug, Clone)]
pub enum LinkAnalytics {
    Limited { total_visits: i64 },
    Full(VisitSummary),
}

/// Read-only service deriving summaries from the visit log.
pub struct AnalyticsService {
    links: Arc<dyn LinkRepository>,
    visits: Arc<dyn VisitRepository>,
}

impl AnalyticsService {
    /// Creates a new analytics service.
    pub fn new(links: Arc<dyn LinkRepository>, visits: Arc<dyn VisitRepository>) -> Self {
        Self { links, visits }
    }

    /// Summarizes a link's traffic for `viewer`.
    ///
    /// Anonymous viewers and non-owners receive only the total visit count.
    /// Zero recorded visits is a normal state and yields zeros and empty
    /// collections, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown code.
    pub async fn summarize(
        &self,
        code: &str,
        viewer: Option<&CurrentUser>,
    ) -> Result<LinkAnalytics, AppError> {
        let link = self.links.find_by_code(code).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })?;

        let is_owner = match (viewer, link.owner_id) {
            (Some(user), Some(owner_id)) => user.user_id == owner_id,
            _ => false,
        };

        if !is_owner {
            return Ok(LinkAnalytics::Limited {
                total_visits: link.visits,
            });
        }

        let recent_visits = self.visits.recent(link.id, RECENT_VISITS).await?;
        let unique_visitors_by_client = self.visits.count_distinct_clients(link.id).await?;
        let seen_emails = self.visits.distinct_emails(link.id).await?;

        let allowed_emails = link
            .allowed_emails
            .iter()
            .map(|email| EmailAccess {
                email: email.clone(),
                accessed: seen_emails.iter().any(|seen| seen == email),
            })
            .collect();

        Ok(LinkAnalytics::Full(VisitSummary {
            total_visits: link.visits,
            unique_visitors_by_client,
            unique_visitors_by_email: seen_emails.len() as i64,
            click_limit: link.click_limit,
            current_clicks: link.current_clicks,
            last_visited_at: link.last_visited_at,
            recent_visits,
            allowed_emails,
        }))
    }
}
