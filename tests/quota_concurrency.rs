//! Concurrency property: with `click_limit = N`, the number of successful
//! resolutions never exceeds N, no matter how many requests race.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::mpsc;

use bouncerlink::application::services::{Outcome, ResolutionService, VisitorInfo};
use bouncerlink::domain::access::Credentials;
use bouncerlink::domain::entities::Link;
use bouncerlink::domain::repositories::{LinkRepository, VisitRepository};
use common::{InMemoryLinkRepository, InMemoryVisitRepository, plain_link};

fn resolution_service(
    links: &Arc<InMemoryLinkRepository>,
    visits: &Arc<InMemoryVisitRepository>,
) -> Arc<ResolutionService> {
    let (tx, _rx) = mpsc::channel(64);
    let link_repo: Arc<dyn LinkRepository> = links.clone();
    let visit_repo: Arc<dyn VisitRepository> = visits.clone();
    Arc::new(ResolutionService::new(link_repo, visit_repo, tx))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_resolutions_never_exceed_click_limit() {
    const LIMIT: i64 = 5;
    const ATTEMPTS: usize = 40;

    let links = Arc::new(InMemoryLinkRepository::new());
    let visits = Arc::new(InMemoryVisitRepository::new());

    let link_id = links.insert_link(Link {
        click_limit: Some(LIMIT),
        ..plain_link("race1234", "https://example.com/target")
    });

    let service = resolution_service(&links, &visits);

    let mut handles = vec![];
    for _ in 0..ATTEMPTS {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .resolve("race1234", &Credentials::default(), &VisitorInfo::default())
                .await
                .unwrap()
        }));
    }

    let mut resolved = 0;
    let mut quota_exceeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Outcome::Resolved { .. } => resolved += 1,
            Outcome::QuotaExceeded => quota_exceeded += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(resolved, LIMIT as usize);
    assert_eq!(quota_exceeded, ATTEMPTS - LIMIT as usize);

    // the counters agree with the outcomes, and the log only holds winners
    let link = links.get("race1234").unwrap();
    assert_eq!(link.current_clicks, LIMIT);
    assert_eq!(link.visits, LIMIT);
    assert_eq!(visits.for_link(link_id).len(), LIMIT as usize);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_resolutions_without_limit_all_succeed() {
    const ATTEMPTS: usize = 40;

    let links = Arc::new(InMemoryLinkRepository::new());
    let visits = Arc::new(InMemoryVisitRepository::new());

    links.insert_link(plain_link("free1234", "https://example.com"));

    let service = resolution_service(&links, &visits);

    let mut handles = vec![];
    for _ in 0..ATTEMPTS {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .resolve("free1234", &Credentials::default(), &VisitorInfo::default())
                .await
                .unwrap()
        }));
    }

    for handle in handles {
        assert!(matches!(handle.await.unwrap(), Outcome::Resolved { .. }));
    }

    let link = links.get("free1234").unwrap();
    assert_eq!(link.visits, ATTEMPTS as i64);
    assert_eq!(link.current_clicks, ATTEMPTS as i64);
}

#[tokio::test]
async fn test_expiry_is_permanent() {
    let links = Arc::new(InMemoryLinkRepository::new());
    let visits = Arc::new(InMemoryVisitRepository::new());

    links.insert_link(Link {
        expires_at: Some(Utc::now() - Duration::seconds(1)),
        ..plain_link("dead1234", "https://example.com")
    });

    let service = resolution_service(&links, &visits);

    for _ in 0..3 {
        let outcome = service
            .resolve("dead1234", &Credentials::default(), &VisitorInfo::default())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Expired);
    }

    // nothing was counted or logged for an expired link
    let link = links.get("dead1234").unwrap();
    assert_eq!(link.visits, 0);
    assert!(visits.all().is_empty());
}
