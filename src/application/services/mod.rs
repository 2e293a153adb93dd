//! Business-logic services orchestrating the domain.

mod analytics_service;
mod auth_service;
mod link_service;
mod resolution_service;

pub use analytics_service::{AnalyticsService, EmailAccess, LinkAnalytics, VisitSummary};
pub use auth_service::AuthService;
pub use link_service::{CreateLinkCommand, LinkService};
pub use resolution_service::{Outcome, ResolutionService, VisitorInfo};
