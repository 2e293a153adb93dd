//! Pure access-control evaluation for gated links.
//!
//! The evaluator is a function of a link snapshot, the supplied credentials,
//! and a clock value. It performs no I/O; the resolution engine is responsible
//! for fetching the snapshot and acting on the verdict.

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;

use crate::domain::entities::Link;

/// Credentials a requester may supply when resolving a gated link.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub access_code: Option<String>,
    pub email: Option<String>,
}

impl Credentials {
    /// Returns true when no credential of either kind was supplied.
    pub fn is_empty(&self) -> bool {
        self.access_code.is_none() && self.email.is_none()
    }
}

/// The evaluator's decision for one resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied(DenyReason),
}

/// Why access was denied.
///
/// `Expired` and `QuotaExceeded` are permanent for the link;
/// `InvalidAccessCode` and `EmailNotAuthorized` can be retried with
/// corrected credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Expired,
    QuotaExceeded,
    InvalidAccessCode,
    EmailNotAuthorized,
}

/// Evaluates whether `credentials` may access `link` at time `now`.
///
/// Checks short-circuit in a fixed order: expiry, click quota, access code,
/// allow-listed email. The access-code and email gates are independent; a
/// link may configure either, both, or neither. An unset gate is skipped
/// entirely, so a link with no gates admits any request that passed the
/// expiry and quota checks.
pub fn evaluate(link: &Link, credentials: &Credentials, now: DateTime<Utc>) -> Verdict {
    if link.is_expired(now) {
        return Verdict::Denied(DenyReason::Expired);
    }

    if link.is_exhausted() {
        return Verdict::Denied(DenyReason::QuotaExceeded);
    }

    if let Some(expected) = &link.access_code {
        let supplied = credentials.access_code.as_deref().unwrap_or("");
        if !constant_time_eq(supplied, expected) {
            return Verdict::Denied(DenyReason::InvalidAccessCode);
        }
    }

    if !link.allowed_emails.is_empty() {
        match &credentials.email {
            Some(email) if link.allowed_emails.iter().any(|e| e == email) => {}
            _ => return Verdict::Denied(DenyReason::EmailNotAuthorized),
        }
    }

    Verdict::Allowed
}

/// Constant-time string comparison for access codes.
///
/// Length is not hidden; the contents are compared without early exit.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}
