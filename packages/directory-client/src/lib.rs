//! Pure Google Workspace Directory API client.
//!
//! Read-only access to group membership on behalf of a service account that
//! impersonates a workspace administrator. No caching or domain logic beyond
//! following pagination.
//!
//! # Example
//!
//! ```rust,ignore
//! use directory_client::DirectoryClient;
//!
//! let client = DirectoryClient::from_service_account_file(
//!     "/etc/snitch/service-account.json",
//!     "admin@example.com",
//! )?;
//!
//! for member in client.list_members("engineering@example.com").await? {
//!     println!("{} ({})", member.email, member.member_type.as_str());
//! }
//! ```

pub mod auth;
pub mod error;
pub mod types;

pub use auth::{ServiceAccountKey, TokenCache};
pub use error::{DirectoryError, Result};
pub use types::{Member, MemberType, MembersPage};

use reqwest::{StatusCode, Url};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const BASE_URL: &str = "https://admin.googleapis.com/admin/directory/v1";

/// Maximum page size accepted by `members.list`.
const MAX_PAGE_SIZE: u32 = 200;

#[derive(Clone)]
pub struct DirectoryClient {
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    base_url: String,
    page_size: u32,
}

impl DirectoryClient {
    pub fn new(token_cache: TokenCache) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DirectoryError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            token_cache: Arc::new(token_cache),
            base_url: BASE_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
        })
    }

    /// Build a client from a key file, impersonating `admin_email`.
    pub fn from_service_account_file(
        path: impl AsRef<Path>,
        admin_email: impl Into<String>,
    ) -> Result<Self> {
        let key = ServiceAccountKey::from_file(path)?;
        Self::new(TokenCache::new(key, admin_email)?)
    }

    /// Set a custom base URL (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the page size, clamped to `1..=200`.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// List the immediate members of a group, following every page.
    ///
    /// Nested groups come back as entries with `MemberType::Group`; they are
    /// not expanded here.
    #[instrument(skip(self))]
    pub async fn list_members(&self, group_key: &str) -> Result<Vec<Member>> {
        let mut members = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(group_key, page_token.as_deref()).await?;
            members.extend(page.members);

            match page.next_page_token {
                Some(token) if !token.is_empty() => {
                    if page_token.as_deref() == Some(token.as_str()) {
                        warn!(page_token = %token, "Directory repeated a page token, stopping pagination");
                        break;
                    }
                    page_token = Some(token);
                }
                _ => break,
            }
        }

        debug!(count = members.len(), "Listed group members");
        Ok(members)
    }

    async fn fetch_page(&self, group_key: &str, page_token: Option<&str>) -> Result<MembersPage> {
        let url = self.members_url(group_key, page_token)?;
        let token = self.token_cache.get_token().await?;

        let resp = self
            .http_client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let body = resp.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(DirectoryError::NotFound(group_key.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                if status == StatusCode::UNAUTHORIZED {
                    self.token_cache.invalidate().await;
                }
                Err(DirectoryError::Forbidden {
                    group: group_key.to_string(),
                    message: body,
                })
            }
            _ => Err(DirectoryError::Api {
                status: status.as_u16(),
                message: body,
            }),
        }
    }

    fn members_url(&self, group_key: &str, page_token: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DirectoryError::Config(format!("invalid base URL: {e}")))?;

        url.path_segments_mut()
            .map_err(|_| DirectoryError::Config("base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(["groups", group_key, "members"]);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("maxResults", &self.page_size.to_string());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../tests/fixtures/service_account.json");

    fn client() -> DirectoryClient {
        let key = ServiceAccountKey::from_json(FIXTURE).unwrap();
        DirectoryClient::new(TokenCache::new(key, "admin@co").unwrap()).unwrap()
    }

    #[test]
    fn members_url_keeps_group_email_in_path() {
        let url = client().members_url("eng@co", None).unwrap();

        assert_eq!(
            url.as_str(),
            "https://admin.googleapis.com/admin/directory/v1/groups/eng@co/members?maxResults=200"
        );
    }

    #[test]
    fn members_url_carries_page_token() {
        let url = client()
            .with_base_url("http://localhost:1234/v1/")
            .with_page_size(50)
            .members_url("eng@co", Some("next page"))
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:1234/v1/groups/eng@co/members?maxResults=50&pageToken=next+page"
        );
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(client().with_page_size(0).page_size, 1);
        assert_eq!(client().with_page_size(1000).page_size, MAX_PAGE_SIZE);
    }
}
