//! Link entity representing an access-gated short URL mapping.

use chrono::{DateTime, Utc};

/// A shortened link with its access-control configuration and counters.
///
/// The short code is the identity and never changes after creation.
/// `owner_email` is denormalized from the owning user at read time so the
/// notification fan-out does not need a second lookup.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub destination_url: String,
    pub owner_id: Option<i64>,
    pub owner_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub access_code: Option<String>,
    pub allowed_emails: Vec<String>,
    pub click_limit: Option<i64>,
    pub current_clicks: i64,
    pub visits: i64,
    pub last_visited_at: Option<DateTime<Utc>>,
    pub notify_on_visit: bool,
}

impl Link {
    /// Returns true if the link has passed its expiry time.
    ///
    /// Expiry is permanent; there is no way to un-expire a link.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now > e)
    }

    /// Returns true if the click quota has been used up.
    pub fn is_exhausted(&self) -> bool {
        self.click_limit
            .is_some_and(|limit| self.current_clicks >= limit)
    }

    /// Returns true if resolving this link requires credentials
    /// (an access code, an allow-listed email, or both).
    pub fn requires_credentials(&self) -> bool {
        self.access_code.is_some() || !self.allowed_emails.is_empty()
    }
}

/// Input data for creating a new link.
///
/// Counters start at zero and are owned by the store from then on.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub destination_url: String,
    pub owner_id: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub access_code: Option<String>,
    pub allowed_emails: Vec<String>,
    pub click_limit: Option<i64>,
    pub notify_on_visit: bool,
}
