//! PostgreSQL implementation of the API token repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::{CurrentUser, TokenRepository};
use crate::error::{AppError, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    email: String,
}

/// PostgreSQL repository for API token lookup.
pub struct PgTokenRepository {
    pool: Arc<PgPool>,
}

impl PgTokenRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn find_user_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<CurrentUser>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id AS user_id, u.email
            FROM api_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = $1 AND t.revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|r| CurrentUser {
            user_id: r.user_id,
            email: r.email,
        }))
    }

    async fn touch_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE api_tokens SET last_used_at = NOW() WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
