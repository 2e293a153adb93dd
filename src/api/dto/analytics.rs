//! DTOs for the analytics endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::{LinkAnalytics, VisitSummary};
use crate::domain::entities::Visit;

/// Click limit as displayed to the owner.
///
/// Serializes as either the number or the literal string `"No limit"`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ClickLimitDisplay {
    Limit(i64),
    NoLimit(&'static str),
}

impl From<Option<i64>> for ClickLimitDisplay {
    fn from(limit: Option<i64>) -> Self {
        match limit {
            Some(n) => ClickLimitDisplay::Limit(n),
            None => ClickLimitDisplay::NoLimit("No limit"),
        }
    }
}

/// One entry in the recent-visits table.
#[derive(Debug, Serialize)]
pub struct VisitInfo {
    pub visited_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub email: Option<String>,
}

impl From<Visit> for VisitInfo {
    fn from(visit: Visit) -> Self {
        VisitInfo {
            visited_at: visit.visited_at,
            ip: visit.ip,
            user_agent: visit.user_agent,
            email: visit.email,
        }
    }
}

/// Access status of one allow-listed email.
#[derive(Debug, Serialize)]
pub struct EmailAccessInfo {
    pub email: String,
    pub accessed: bool,
}

/// Analytics payload, shaped by what the viewer may see.
///
/// Untagged: non-owners get only the total count, owners get the full
/// summary. `is_authenticated` lets the caller distinguish "log in to see
/// more" from "this is not your link".
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalyticsResponse {
    Limited {
        total_visits: i64,
        is_authenticated: bool,
    },
    Full {
        total_visits: i64,
        unique_visitors_by_client: i64,
        unique_visitors_by_email: i64,
        click_limit: ClickLimitDisplay,
        current_clicks: i64,
        last_visited_at: Option<DateTime<Utc>>,
        recent_visits: Vec<VisitInfo>,
        allowed_emails: Vec<EmailAccessInfo>,
    },
}

impl AnalyticsResponse {
    /// Builds the wire shape from a service result.
    pub fn from_analytics(analytics: LinkAnalytics, is_authenticated: bool) -> Self {
        match analytics {
            LinkAnalytics::Limited { total_visits } => AnalyticsResponse::Limited {
                total_visits,
                is_authenticated,
            },
            LinkAnalytics::Full(summary) => Self::from_summary(summary),
        }
    }

    fn from_summary(summary: VisitSummary) -> Self {
        AnalyticsResponse::Full {
            total_visits: summary.total_visits,
            unique_visitors_by_client: summary.unique_visitors_by_client,
            unique_visitors_by_email: summary.unique_visitors_by_email,
            click_limit: summary.click_limit.into(),
            current_clicks: summary.current_clicks,
            last_visited_at: summary.last_visited_at,
            recent_visits: summary.recent_visits.into_iter().map(Into::into).collect(),
            allowed_emails: summary
                .allowed_emails
                .into_iter()
                .map(|e| EmailAccessInfo {
                    email: e.email,
                    accessed: e.accessed,
                })
                .collect(),
        }
    }
}
