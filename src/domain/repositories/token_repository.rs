//! Repository trait for API token lookup.

use crate::error::AppError;
use async_trait::async_trait;

/// The authenticated identity a valid token resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,
    pub email: String,
}

/// Storage interface for API tokens.
///
/// Tokens are stored as HMAC-SHA256 hashes; the raw token never reaches the
/// repository. Issuance and revocation are operator concerns handled by the
/// admin CLI, not by this interface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Resolves a token hash to its owning user.
    ///
    /// Returns `Ok(None)` for unknown or revoked tokens.
    async fn find_user_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<CurrentUser>, AppError>;

    /// Records when the token was last used, for audit.
    async fn touch_last_used(&self, token_hash: &str) -> Result<(), AppError>;
}
