//! PostgreSQL implementation of the visit log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewVisit, Visit};
use crate::domain::repositories::VisitRepository;
use crate::error::{AppError, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct VisitRow {
    id: i64,
    link_id: i64,
    visited_at: DateTime<Utc>,
    ip: Option<String>,
    user_agent: Option<String>,
    email: Option<String>,
}

impl From<VisitRow> for Visit {
    fn from(row: VisitRow) -> Self {
        Visit {
            id: row.id,
            link_id: row.link_id,
            visited_at: row.visited_at,
            ip: row.ip,
            user_agent: row.user_agent,
            email: row.email,
        }
    }
}

/// PostgreSQL repository for the append-only visit log.
pub struct PgVisitRepository {
    pool: Arc<PgPool>,
}

impl PgVisitRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitRepository for PgVisitRepository {
    async fn append(&self, new_visit: NewVisit) -> Result<Visit, AppError> {
        let row = sqlx::query_as::<_, VisitRow>(
            r#"
            INSERT INTO visits (link_id, ip, user_agent, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, link_id, visited_at, ip, user_agent, email
            "#,
        )
        .bind(new_visit.link_id)
        .bind(&new_visit.ip)
        .bind(&new_visit.user_agent)
        .bind(&new_visit.email)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn recent(&self, link_id: i64, limit: i64) -> Result<Vec<Visit>, AppError> {
        let rows = sqlx::query_as::<_, VisitRow>(
            r#"
            SELECT id, link_id, visited_at, ip, user_agent, email
            FROM visits
            WHERE link_id = $1
            ORDER BY visited_at DESC
            LIMIT $2
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_distinct_clients(&self, link_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM (
                SELECT DISTINCT ip, user_agent
                FROM visits
                WHERE link_id = $1
            ) AS clients
            "#,
        )
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn distinct_emails(&self, link_id: i64) -> Result<Vec<String>, AppError> {
        let emails: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT email
            FROM visits
            WHERE link_id = $1 AND email IS NOT NULL
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(emails)
    }
}
