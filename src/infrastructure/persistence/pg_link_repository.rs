//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, map_sqlx_error};

/// Columns selected for a full link, with the owner's email joined in.
const LINK_COLUMNS: &str = r#"
    l.id, l.code, l.destination_url, l.owner_id, u.email AS owner_email,
    l.created_at, l.expires_at, l.access_code, l.allowed_emails,
    l.click_limit, l.current_clicks, l.visits, l.last_visited_at, l.notify_on_visit
"#;

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    destination_url: String,
    owner_id: Option<i64>,
    owner_email: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    access_code: Option<String>,
    allowed_emails: Vec<String>,
    click_limit: Option<i64>,
    current_clicks: i64,
    visits: i64,
    last_visited_at: Option<DateTime<Utc>>,
    notify_on_visit: bool,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            code: row.code,
            destination_url: row.destination_url,
            owner_id: row.owner_id,
            owner_email: row.owner_email,
            created_at: row.created_at,
            expires_at: row.expires_at,
            access_code: row.access_code,
            allowed_emails: row.allowed_emails,
            click_limit: row.click_limit,
            current_clicks: row.current_clicks,
            visits: row.visits,
            last_visited_at: row.last_visited_at,
            notify_on_visit: row.notify_on_visit,
        }
    }
}

/// PostgreSQL repository for link storage.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO links
                    (code, destination_url, owner_id, expires_at, access_code,
                     allowed_emails, click_limit, notify_on_visit)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT {LINK_COLUMNS}
            FROM inserted l
            LEFT JOIN users u ON u.id = l.owner_id
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(&new_link.code)
            .bind(&new_link.destination_url)
            .bind(new_link.owner_id)
            .bind(new_link.expires_at)
            .bind(&new_link.access_code)
            .bind(&new_link.allowed_emails)
            .bind(new_link.click_limit)
            .bind(new_link.notify_on_visit)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links l
            LEFT JOIN users u ON u.id = l.owner_id
            WHERE l.code = $1
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn register_visit(&self, link_id: i64, now: DateTime<Utc>) -> Result<bool, AppError> {
        // Quota check, both counters, and the last-visited touch in one
        // statement: either the whole visit commits or a concurrent request
        // already took the last slot.
        let result = sqlx::query(
            r#"
            UPDATE links
            SET current_clicks = current_clicks + 1,
                visits = visits + 1,
                last_visited_at = $2
            WHERE id = $1
              AND (click_limit IS NULL OR current_clicks < click_limit)
            "#,
        )
        .bind(link_id)
        .bind(now)
        .execute(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links l
            LEFT JOIN users u ON u.id = l.owner_id
            WHERE l.owner_id = $1
            ORDER BY l.created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }
}
