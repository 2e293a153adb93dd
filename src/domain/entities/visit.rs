//! Visit entity representing one recorded, authorized access.

use chrono::{DateTime, Utc};

/// A visit recorded when a link resolves successfully.
///
/// Rows are append-only: the core never updates or deletes them. All client
/// metadata is optional; `email` is present only when the link required
/// email-gated access and the requester supplied one.
#[derive(Debug, Clone)]
pub struct Visit {
    pub id: i64,
    pub link_id: i64,
    pub visited_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub email: Option<String>,
}

/// Input data for appending a visit to the log.
///
/// The timestamp is assigned by the store at insert time.
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub link_id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_minimal() {
        let visit = Visit {
            id: 1,
            link_id: 10,
            visited_at: Utc::now(),
            ip: None,
            user_agent: None,
            email: None,
        };

        assert_eq!(visit.link_id, 10);
        assert!(visit.ip.is_none());
        assert!(visit.email.is_none());
    }

    #[test]
    fn test_new_visit_carries_metadata() {
        let new_visit = NewVisit {
            link_id: 99,
            ip: Some("10.0.0.1".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            email: Some("a@x.com".to_string()),
        };

        assert_eq!(new_visit.link_id, 99);
        assert_eq!(new_visit.email.as_deref(), Some("a@x.com"));
    }
}
