//! Link resolution engine.
//!
//! Orchestrates the per-request decision chain: lookup, expiry and quota
//! checks, credential challenge, access evaluation, then the visit commit and
//! notification fan-out. All checks before the commit run against the single
//! link snapshot read at lookup time; the commit itself re-validates the quota
//! at the store so concurrent resolutions cannot overshoot a click limit.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::domain::access::{Credentials, DenyReason, Verdict, evaluate};
use crate::domain::entities::{Link, NewVisit};
use crate::domain::notification_worker::NotificationRequest;
use crate::domain::repositories::{LinkRepository, VisitRepository};
use crate::error::AppError;

/// Request metadata captured for the visit log, best-effort.
#[derive(Debug, Clone, Default)]
pub struct VisitorInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// The full result of one resolution attempt.
///
/// Every variant is semantically distinct and the API layer maps them to
/// distinct responses; in particular `AccessChallengeRequired` (no credentials
/// were supplied to a gated link) is not a denial, and `Expired` /
/// `QuotaExceeded` are permanent while `Denied` can be retried with corrected
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NotFound,
    Expired,
    QuotaExceeded,
    AccessChallengeRequired {
        needs_access_code: bool,
        needs_email: bool,
    },
    Denied(DenyReason),
    Resolved {
        url: String,
    },
}

/// Service resolving short codes into redirect destinations.
pub struct ResolutionService {
    links: Arc<dyn LinkRepository>,
    visits: Arc<dyn VisitRepository>,
    notify_tx: mpsc::Sender<NotificationRequest>,
}

impl ResolutionService {
    /// Creates a new resolution service.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        visits: Arc<dyn VisitRepository>,
        notify_tx: mpsc::Sender<NotificationRequest>,
    ) -> Self {
        Self {
            links,
            visits,
            notify_tx,
        }
    }

    /// Resolves `code` with the supplied credentials and request metadata.
    ///
    /// Deliberately not idempotent: every `Resolved` outcome is a new click,
    /// incrementing the counters and appending one visit entry.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures surface as `Err`; every access decision,
    /// including "no such code", is an [`Outcome`].
    pub async fn resolve(
        &self,
        code: &str,
        credentials: &Credentials,
        visitor: &VisitorInfo,
    ) -> Result<Outcome, AppError> {
        let Some(link) = self.links.find_by_code(code).await? else {
            return Ok(Outcome::NotFound);
        };

        let now = Utc::now();

        if link.is_expired(now) {
            return Ok(Outcome::Expired);
        }

        if link.is_exhausted() {
            return Ok(Outcome::QuotaExceeded);
        }

        if link.requires_credentials() && credentials.is_empty() {
            return Ok(Outcome::AccessChallengeRequired {
                needs_access_code: link.access_code.is_some(),
                needs_email: !link.allowed_emails.is_empty(),
            });
        }

        match evaluate(&link, credentials, now) {
            Verdict::Denied(DenyReason::Expired) => return Ok(Outcome::Expired),
            Verdict::Denied(DenyReason::QuotaExceeded) => return Ok(Outcome::QuotaExceeded),
            Verdict::Denied(reason) => return Ok(Outcome::Denied(reason)),
            Verdict::Allowed => {}
        }

        // The store re-checks the quota inside a single conditional update, so
        // two requests racing for the last slot cannot both land here and win.
        if !self.links.register_visit(link.id, now).await? {
            return Ok(Outcome::QuotaExceeded);
        }

        // Record the accessing email only for email-gated links.
        let visit_email = if link.allowed_emails.is_empty() {
            None
        } else {
            credentials.email.clone()
        };

        if let Err(e) = self
            .visits
            .append(NewVisit {
                link_id: link.id,
                ip: visitor.ip.clone(),
                user_agent: visitor.user_agent.clone(),
                email: visit_email,
            })
            .await
        {
            // The increment above is the authoritative record of the click;
            // a lost log entry is surfaced to operators, not to the caller.
            metrics::counter!("visit_log_append_failures").increment(1);
            error!(code = %link.code, error = %e, "visit counted but log append failed");
        }

        self.dispatch_notifications(&link);

        Ok(Outcome::Resolved {
            url: link.destination_url,
        })
    }

    /// Enqueues one notification per configured recipient.
    ///
    /// Recipients are the owner plus, for email-gated links, every
    /// allow-listed email, deduplicated. Enqueueing is non-blocking; a full
    /// queue drops the notification.
    fn dispatch_notifications(&self, link: &Link) {
        if !link.notify_on_visit {
            return;
        }

        let Some(owner_email) = &link.owner_email else {
            return;
        };

        let mut recipients = vec![owner_email.clone()];
        for email in &link.allowed_emails {
            if !recipients.contains(email) {
                recipients.push(email.clone());
            }
        }

        for recipient in recipients {
            let request = NotificationRequest {
                recipient,
                code: link.code.clone(),
            };
            if self.notify_tx.try_send(request).is_err() {
                metrics::counter!("notifications_dropped").increment(1);
                warn!(code = %link.code, "notification queue full, dropping");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockLinkRepository, MockVisitRepository};
    use crate::domain::entities::Visit;
    use chrono::Duration;
    use serde_json::json;

    fn plain_link(id: i64, code: &str) -> Link {
        Link {
            id,
            code: code.to_string(),
            destination_url: "https://example.com/target".to_string(),
            owner_id: None,
            owner_email: None,
            created_at: Utc::now(),
            expires_at: None,
            access_code: None,
            allowed_emails: vec![],
            click_limit: None,
            current_clicks: 0,
            visits: 0,
            last_visited_at: None,
            notify_on_visit: false,
        }
    }

    fn gated_link(id: i64, code: &str) -> Link {
        Link {
            owner_id: Some(7),
            owner_email: Some("owner@x.com".to_string()),
            access_code: Some("xyz".to_string()),
            allowed_emails: vec!["a@x.com".to_string(), "b@x.com".to_string()],
            ..plain_link(id, code)
        }
    }

    fn service(
        links: MockLinkRepository,
        visits: MockVisitRepository,
    ) -> (ResolutionService, mpsc::Receiver<NotificationRequest>) {
        let (tx, rx) = mpsc::channel(16);
        (
            ResolutionService::new(Arc::new(links), Arc::new(visits), tx),
            rx,
        )
    }

    fn appended_visit(new_visit: &NewVisit) -> Visit {
        Visit {
            id: 1,
            link_id: new_visit.link_id,
            visited_at: Utc::now(),
            ip: new_visit.ip.clone(),
            user_agent: new_visit.user_agent.clone(),
            email: new_visit.email.clone(),
        }
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .withf(|code| code == "missing1")
            .times(1)
            .returning(|_| Ok(None));

        let (svc, _rx) = service(links, MockVisitRepository::new());

        let outcome = svc
            .resolve("missing1", &Credentials::default(), &VisitorInfo::default())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error_not_not_found() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|_| {
            Err(AppError::unavailable(
                "Link store unavailable",
                json!({ "retryable": true }),
            ))
        });

        let (svc, _rx) = service(links, MockVisitRepository::new());

        let result = svc
            .resolve("whatever", &Credentials::default(), &VisitorInfo::default())
            .await;

        assert!(matches!(result, Err(AppError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_expired_link_regardless_of_credentials() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|code| {
            Ok(Some(Link {
                expires_at: Some(Utc::now() - Duration::hours(1)),
                ..gated_link(1, code)
            }))
        });

        let (svc, _rx) = service(links, MockVisitRepository::new());

        let credentials = Credentials {
            access_code: Some("xyz".to_string()),
            email: Some("a@x.com".to_string()),
        };
        let outcome = svc
            .resolve("gone1234", &credentials, &VisitorInfo::default())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Expired);
    }

    #[tokio::test]
    async fn test_exhausted_link_is_quota_exceeded() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|code| {
            Ok(Some(Link {
                click_limit: Some(1),
                current_clicks: 1,
                ..plain_link(1, code)
            }))
        });

        let (svc, _rx) = service(links, MockVisitRepository::new());

        let outcome = svc
            .resolve("used1234", &Credentials::default(), &VisitorInfo::default())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::QuotaExceeded);
    }

    #[tokio::test]
    async fn test_gated_link_without_credentials_challenges() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .times(1)
            .returning(|code| Ok(Some(gated_link(1, code))));

        let (svc, _rx) = service(links, MockVisitRepository::new());

        let outcome = svc
            .resolve("gate1234", &Credentials::default(), &VisitorInfo::default())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::AccessChallengeRequired {
                needs_access_code: true,
                needs_email: true,
            }
        );
    }

    #[tokio::test]
    async fn test_wrong_access_code_is_denied_not_challenged() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|code| {
            Ok(Some(Link {
                access_code: Some("xyz".to_string()),
                ..plain_link(1, code)
            }))
        });

        let (svc, _rx) = service(links, MockVisitRepository::new());

        let credentials = Credentials {
            access_code: Some("wrong".to_string()),
            email: None,
        };
        let outcome = svc
            .resolve("gate1234", &credentials, &VisitorInfo::default())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Denied(DenyReason::InvalidAccessCode));
    }

    #[tokio::test]
    async fn test_unlisted_email_is_denied() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|code| {
            Ok(Some(Link {
                allowed_emails: vec!["a@x.com".to_string()],
                ..plain_link(1, code)
            }))
        });

        let (svc, _rx) = service(links, MockVisitRepository::new());

        let credentials = Credentials {
            access_code: None,
            email: Some("intruder@x.com".to_string()),
        };
        let outcome = svc
            .resolve("gate1234", &credentials, &VisitorInfo::default())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Denied(DenyReason::EmailNotAuthorized));
    }

    #[tokio::test]
    async fn test_ungated_link_resolves_and_records_visit() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .times(1)
            .returning(|code| Ok(Some(plain_link(42, code))));
        links
            .expect_register_visit()
            .withf(|link_id, _| *link_id == 42)
            .times(1)
            .returning(|_, _| Ok(true));

        let mut visits = MockVisitRepository::new();
        visits
            .expect_append()
            .withf(|v| {
                v.link_id == 42
                    && v.ip.as_deref() == Some("203.0.113.9")
                    && v.user_agent.as_deref() == Some("Mozilla/5.0")
                    && v.email.is_none()
            })
            .times(1)
            .returning(|v| Ok(appended_visit(&v)));

        let (svc, _rx) = service(links, visits);

        let visitor = VisitorInfo {
            ip: Some("203.0.113.9".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        };
        let outcome = svc
            .resolve("open1234", &Credentials::default(), &visitor)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Resolved {
                url: "https://example.com/target".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_email_recorded_only_for_email_gated_links() {
        // ungated link, requester volunteers an email anyway: not recorded
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .times(1)
            .returning(|code| Ok(Some(plain_link(1, code))));
        links
            .expect_register_visit()
            .times(1)
            .returning(|_, _| Ok(true));

        let mut visits = MockVisitRepository::new();
        visits
            .expect_append()
            .withf(|v| v.email.is_none())
            .times(1)
            .returning(|v| Ok(appended_visit(&v)));

        let (svc, _rx) = service(links, visits);

        let credentials = Credentials {
            access_code: None,
            email: Some("volunteer@x.com".to_string()),
        };
        let outcome = svc
            .resolve("open1234", &credentials, &VisitorInfo::default())
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Resolved { .. }));
    }

    #[tokio::test]
    async fn test_lost_quota_race_degrades_to_quota_exceeded() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|code| {
            Ok(Some(Link {
                click_limit: Some(5),
                current_clicks: 4,
                ..plain_link(1, code)
            }))
        });
        // snapshot said one slot left, but a concurrent request took it
        links
            .expect_register_visit()
            .times(1)
            .returning(|_, _| Ok(false));

        let mut visits = MockVisitRepository::new();
        visits.expect_append().times(0);

        let (svc, _rx) = service(links, visits);

        let outcome = svc
            .resolve("race1234", &Credentials::default(), &VisitorInfo::default())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::QuotaExceeded);
    }

    #[tokio::test]
    async fn test_append_failure_does_not_fail_resolution() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .times(1)
            .returning(|code| Ok(Some(plain_link(1, code))));
        links
            .expect_register_visit()
            .times(1)
            .returning(|_, _| Ok(true));

        let mut visits = MockVisitRepository::new();
        visits
            .expect_append()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let (svc, _rx) = service(links, visits);

        let outcome = svc
            .resolve("open1234", &Credentials::default(), &VisitorInfo::default())
            .await
            .unwrap();

        // the increment already committed; the caller still gets the redirect
        assert!(matches!(outcome, Outcome::Resolved { .. }));
    }

    #[tokio::test]
    async fn test_resolution_is_not_idempotent() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .times(2)
            .returning(|code| Ok(Some(plain_link(1, code))));
        links
            .expect_register_visit()
            .times(2)
            .returning(|_, _| Ok(true));

        let mut visits = MockVisitRepository::new();
        visits
            .expect_append()
            .times(2)
            .returning(|v| Ok(appended_visit(&v)));

        let (svc, _rx) = service(links, visits);

        for _ in 0..2 {
            let outcome = svc
                .resolve("open1234", &Credentials::default(), &VisitorInfo::default())
                .await
                .unwrap();
            assert!(matches!(outcome, Outcome::Resolved { .. }));
        }
        // the .times(2) expectations above are the assertion: two resolutions,
        // two increments, two log entries
    }

    #[tokio::test]
    async fn test_notification_fan_out_owner_plus_allowed_emails() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|code| {
            Ok(Some(Link {
                notify_on_visit: true,
                ..gated_link(1, code)
            }))
        });
        links
            .expect_register_visit()
            .times(1)
            .returning(|_, _| Ok(true));

        let mut visits = MockVisitRepository::new();
        visits
            .expect_append()
            .withf(|v| v.email.as_deref() == Some("a@x.com"))
            .times(1)
            .returning(|v| Ok(appended_visit(&v)));

        let (svc, mut rx) = service(links, visits);

        let credentials = Credentials {
            access_code: Some("xyz".to_string()),
            email: Some("a@x.com".to_string()),
        };
        let outcome = svc
            .resolve("gate1234", &credentials, &VisitorInfo::default())
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Resolved { .. }));

        let mut recipients = vec![];
        while let Ok(req) = rx.try_recv() {
            assert_eq!(req.code, "gate1234");
            recipients.push(req.recipient);
        }
        assert_eq!(recipients, vec!["owner@x.com", "a@x.com", "b@x.com"]);
    }

    #[tokio::test]
    async fn test_no_notifications_when_disabled() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|code| {
            Ok(Some(Link {
                notify_on_visit: false,
                ..gated_link(1, code)
            }))
        });
        links
            .expect_register_visit()
            .times(1)
            .returning(|_, _| Ok(true));

        let mut visits = MockVisitRepository::new();
        visits
            .expect_append()
            .times(1)
            .returning(|v| Ok(appended_visit(&v)));

        let (svc, mut rx) = service(links, visits);

        let credentials = Credentials {
            access_code: Some("xyz".to_string()),
            email: Some("a@x.com".to_string()),
        };
        svc.resolve("gate1234", &credentials, &VisitorInfo::default())
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_owner_in_allow_list_notified_once() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|code| {
            Ok(Some(Link {
                notify_on_visit: true,
                allowed_emails: vec!["owner@x.com".to_string()],
                ..gated_link(1, code)
            }))
        });
        links
            .expect_register_visit()
            .times(1)
            .returning(|_, _| Ok(true));

        let mut visits = MockVisitRepository::new();
        visits
            .expect_append()
            .times(1)
            .returning(|v| Ok(appended_visit(&v)));

        let (svc, mut rx) = service(links, visits);

        let credentials = Credentials {
            access_code: Some("xyz".to_string()),
            email: Some("owner@x.com".to_string()),
        };
        svc.resolve("gate1234", &credentials, &VisitorInfo::default())
            .await
            .unwrap();

        let mut recipients = vec![];
        while let Ok(req) = rx.try_recv() {
            recipients.push(req.recipient);
        }
        assert_eq!(recipients, vec!["owner@x.com"]);
    }
}
