//! DTOs for link creation.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::{Validate, ValidateEmail, ValidationError};

/// Compiled regex for custom code validation.
static CUSTOM_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

/// Request to create a short link.
///
/// The gating fields (`expires_at`, `access_code`, `allowed_emails`,
/// `click_limit`, `notify_on_visit`) are honored only for authenticated
/// callers; anonymous creations ignore them and receive a fixed 24-hour
/// lifetime.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The destination URL (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Optional custom short code (validated for length and characters).
    #[validate(length(min = 4, max = 32))]
    #[validate(regex(path = "*CUSTOM_CODE_REGEX"))]
    pub custom_code: Option<String>,

    /// Optional expiry timestamp. After this time, resolution returns 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,

    /// Optional secret the requester must present to resolve the link.
    #[validate(length(min = 1, max = 128))]
    pub access_code: Option<String>,

    /// Emails allowed to resolve the link; empty means no email gate.
    #[serde(default)]
    #[validate(custom(function = "validate_email_list"))]
    pub allowed_emails: Vec<String>,

    /// Optional maximum number of successful resolutions.
    #[validate(range(min = 1))]
    pub click_limit: Option<i64>,

    /// When true, the owner (and allow-listed emails) are notified per visit.
    #[serde(default)]
    pub notify_on_visit: bool,
}

/// Every allow-listed entry must look like an email address.
fn validate_email_list(emails: &[String]) -> Result<(), ValidationError> {
    for email in emails {
        if !email.validate_email() {
            return Err(ValidationError::new("invalid_email"));
        }
    }
    Ok(())
}

/// Response for a created link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub code: String,
    pub short_url: String,
    pub destination_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}
