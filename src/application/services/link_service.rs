//! Link creation and listing service.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use url::Url;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{CurrentUser, LinkRepository};
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, validate_custom_code};

/// Lifetime forced onto links created without an authenticated owner.
const ANONYMOUS_LINK_TTL_HOURS: i64 = 24;

/// Attempts at generating a collision-free random code before giving up.
const MAX_GENERATION_ATTEMPTS: usize = 10;

/// Caller intent for creating a link.
///
/// Gating fields are honored only for authenticated creators; anonymous
/// creation overrides them (see [`LinkService::create_link`]).
#[derive(Debug, Clone, Default)]
pub struct CreateLinkCommand {
    pub url: String,
    pub custom_code: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub access_code: Option<String>,
    pub allowed_emails: Vec<String>,
    pub click_limit: Option<i64>,
    pub notify_on_visit: bool,
}

/// Service for creating and listing short links.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(links: Arc<dyn LinkRepository>) -> Self {
        Self { links }
    }

    /// Creates a short link.
    ///
    /// # Anonymous creation
    ///
    /// Without an authenticated owner the command's gating fields are
    /// discarded, not rejected: the link gets a fixed 24-hour expiry, no
    /// access code, an empty email list, no click limit, and notifications
    /// off, regardless of what the caller sent.
    ///
    /// # Code selection
    ///
    /// A custom code is validated and checked for collision
    /// ([`AppError::Conflict`] if taken). Otherwise a random 8-character code
    /// is generated; a residual collision at insert time triggers
    /// regeneration rather than overwriting.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid destination URL,
    /// custom code, or click limit; [`AppError::Conflict`] for a taken custom
    /// code.
    pub async fn create_link(
        &self,
        command: CreateLinkCommand,
        owner: Option<&CurrentUser>,
    ) -> Result<Link, AppError> {
        let destination_url = validate_destination(&command.url)?;

        let new_link = match owner {
            Some(user) => {
                if let Some(limit) = command.click_limit
                    && limit < 1
                {
                    return Err(AppError::bad_request(
                        "Click limit must be a positive integer",
                        json!({ "click_limit": limit }),
                    ));
                }

                NewLink {
                    code: String::new(),
                    destination_url,
                    owner_id: Some(user.user_id),
                    expires_at: command.expires_at,
                    access_code: command.access_code.filter(|c| !c.is_empty()),
                    allowed_emails: command.allowed_emails,
                    click_limit: command.click_limit,
                    notify_on_visit: command.notify_on_visit,
                }
            }
            None => NewLink {
                code: String::new(),
                destination_url,
                owner_id: None,
                expires_at: Some(Utc::now() + Duration::hours(ANONYMOUS_LINK_TTL_HOURS)),
                access_code: None,
                allowed_emails: vec![],
                click_limit: None,
                notify_on_visit: false,
            },
        };

        match command.custom_code {
            Some(custom) => {
                validate_custom_code(&custom)?;

                if self.links.find_by_code(&custom).await?.is_some() {
                    return Err(AppError::conflict(
                        "Custom code already exists",
                        json!({ "code": custom }),
                    ));
                }

                self.links
                    .create(NewLink {
                        code: custom,
                        ..new_link
                    })
                    .await
            }
            None => self.create_with_generated_code(new_link).await,
        }
    }

    /// Retrieves a link by code, as a hard error when absent.
    pub async fn get_link_by_code(&self, code: &str) -> Result<Link, AppError> {
        self.links.find_by_code(code).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })
    }

    /// Lists an owner's links, newest first, with the total for pagination.
    pub async fn list_links(
        &self,
        owner: &CurrentUser,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Link>, i64), AppError> {
        let items = self.links.list_by_owner(owner.user_id, offset, limit).await?;
        let total = self.links.count_by_owner(owner.user_id).await?;
        Ok((items, total))
    }

    /// Constructs the full short URL for a code.
    pub fn short_url(&self, base_url: &str, code: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), code)
    }

    /// Inserts with freshly generated codes until one sticks.
    ///
    /// A unique-violation conflict from the store means the generated code
    /// raced an existing one; regenerate and retry instead of overwriting.
    async fn create_with_generated_code(&self, template: NewLink) -> Result<Link, AppError> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let candidate = NewLink {
                code: generate_code(),
                ..template.clone()
            };

            match self.links.create(candidate).await {
                Err(AppError::Conflict { .. }) => continue,
                result => return result,
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}

/// Validates and canonicalizes a destination URL.
///
/// Only http and https destinations are accepted; `javascript:` and friends
/// must not become redirect targets.
fn validate_destination(input: &str) -> Result<String, AppError> {
    let url = Url::parse(input)
        .map_err(|e| AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() })))?;

    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        scheme => Err(AppError::bad_request(
            "Only HTTP and HTTPS destinations are allowed",
            json!({ "scheme": scheme }),
        )),
    }
}
