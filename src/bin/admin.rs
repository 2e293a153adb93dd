//! CLI administration tool for bouncerlink.
//!
//! Manages users and API tokens without requiring HTTP API access. Raw
//! tokens are printed exactly once, at creation; only their HMAC hash is
//! stored.
//!
//! # Usage
//!
//! ```bash
//! # Create a user
//! cargo run --bin admin -- user create --email owner@example.com
//!
//! # Issue an API token for a user
//! cargo run --bin admin -- token create --email owner@example.com --name "CLI"
//!
//! # List tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke a token by name
//! cargo run --bin admin -- token revoke "CLI"
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required for token commands): HMAC key, must
//!   match the server's

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use sqlx::PgPool;

type HmacSha256 = Hmac<Sha256>;

/// CLI tool for managing bouncerlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// The user's email (owner identity and notification recipient)
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a new API token for an existing user
    Create {
        /// Email of the owning user
        #[arg(short, long)]
        email: String,

        /// Token name (e.g. "Production API", "CLI")
        #[arg(short, long, default_value = "default")]
        name: String,
    },

    /// List all tokens
    List,

    /// Revoke a token by name
    Revoke {
        /// Name of the token to revoke
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => match action {
            UserAction::Create { email } => create_user(&pool, &email).await,
        },
        Commands::Token { action } => match action {
            TokenAction::Create { email, name } => create_token(&pool, &email, &name).await,
            TokenAction::List => list_tokens(&pool).await,
            TokenAction::Revoke { name } => revoke_token(&pool, &name).await,
        },
    }
}

async fn create_user(pool: &PgPool, email: &str) -> Result<()> {
    let id: i64 = sqlx::query_scalar("INSERT INTO users (email) VALUES ($1) RETURNING id")
        .bind(email)
        .fetch_one(pool)
        .await
        .context("Failed to create user (email may already exist)")?;

    println!("{} user #{id} ({email})", "Created".green().bold());
    Ok(())
}

async fn create_token(pool: &PgPool, email: &str, name: &str) -> Result<()> {
    let signing_secret =
        std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;

    let user_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .with_context(|| format!("No user with email {email}"))?;

    let raw_token = generate_token()?;
    let token_hash = hash_token(&signing_secret, &raw_token);

    sqlx::query("INSERT INTO api_tokens (user_id, token_hash, name) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(&token_hash)
        .bind(name)
        .execute(pool)
        .await
        .context("Failed to store token")?;

    println!("{} token '{name}' for {email}", "Created".green().bold());
    println!();
    println!("  {}", raw_token.yellow().bold());
    println!();
    println!("{}", "Store it now; it will not be shown again.".red());
    Ok(())
}

async fn list_tokens(pool: &PgPool) -> Result<()> {
    #[derive(sqlx::FromRow)]
    struct TokenRow {
        name: String,
        email: String,
        created_at: chrono::DateTime<chrono::Utc>,
        last_used_at: Option<chrono::DateTime<chrono::Utc>>,
        revoked_at: Option<chrono::DateTime<chrono::Utc>>,
    }

    let rows = sqlx::query_as::<_, TokenRow>(
        r#"
        SELECT t.name, u.email, t.created_at, t.last_used_at, t.revoked_at
        FROM api_tokens t
        JOIN users u ON u.id = t.user_id
        ORDER BY t.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        println!("No tokens.");
        return Ok(());
    }

    for row in rows {
        let status = if row.revoked_at.is_some() {
            "revoked".red()
        } else {
            "active".green()
        };
        let last_used = row
            .last_used_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "{} [{}] owner={} created={} last_used={}",
            row.name.bold(),
            status,
            row.email,
            row.created_at.to_rfc3339(),
            last_used,
        );
    }
    Ok(())
}

async fn revoke_token(pool: &PgPool, name: &str) -> Result<()> {
    let result =
        sqlx::query("UPDATE api_tokens SET revoked_at = NOW() WHERE name = $1 AND revoked_at IS NULL")
            .bind(name)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        println!("{} no active token named '{name}'", "Error:".red().bold());
    } else {
        println!(
            "{} {} token(s) named '{name}'",
            "Revoked".green().bold(),
            result.rows_affected()
        );
    }
    Ok(())
}

/// Generates a 64-character hex token from 32 CSPRNG bytes.
fn generate_token() -> Result<String> {
    let mut buffer = [0u8; 32];
    getrandom::fill(&mut buffer).context("System RNG failure")?;
    Ok(hex::encode(buffer))
}

fn hash_token(signing_secret: &str, token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
