//! DTOs for credentialed resolution of gated links.

use serde::{Deserialize, Serialize};

/// Credentials submitted against a gated link.
///
/// Both fields are optional: a link may gate on either, and the engine
/// decides which are required.
#[derive(Debug, Default, Deserialize)]
pub struct AccessRequest {
    pub access_code: Option<String>,
    pub email: Option<String>,
}

/// Successful credentialed resolution: the caller performs the redirect.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub url: String,
}

/// Tells the caller which credentials to prompt for.
///
/// Returned when a gated link is resolved without credentials; distinct from
/// a denial, which means credentials were supplied and rejected.
#[derive(Debug, Serialize)]
pub struct AccessChallenge {
    pub error: &'static str,
    pub requires_access_code: bool,
    pub requires_email: bool,
}
