//! DTOs for the health endpoint.

use serde::Serialize;

/// Status of one dependency check.
#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: &'static str,
    pub message: String,
}

/// Component checks included in the health response.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
    pub notification_queue: CheckStatus,
}

/// Full health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub checks: HealthChecks,
}
