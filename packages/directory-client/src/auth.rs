//! Service-account authentication for the Directory API.
//!
//! Uses the OAuth 2.0 JWT-bearer grant: an RS256 assertion signed with the
//! service account key, with `sub` set to the administrator being
//! impersonated (domain-wide delegation), is exchanged for an access token.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{DirectoryError, Result};

pub const GROUP_MEMBER_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/admin.directory.group.member.readonly";
pub const GROUP_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/admin.directory.group.readonly";

const READONLY_SCOPES: [&str; 2] = [GROUP_MEMBER_READONLY_SCOPE, GROUP_READONLY_SCOPE];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// On-disk layout of a service-account key file.
#[derive(Deserialize)]
struct ServiceAccountFile {
    #[serde(rename = "type")]
    key_type: Option<String>,
    client_email: String,
    private_key: String,
    private_key_id: Option<String>,
    token_uri: Option<String>,
}

/// Parsed service-account key.
#[derive(Debug)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key_id: Option<String>,
    pub token_uri: String,
    private_key: SecretString,
}

impl ServiceAccountKey {
    /// Read and parse a key file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DirectoryError::Credentials(format!("unable to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Parse key file contents.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ServiceAccountFile = serde_json::from_str(json)
            .map_err(|e| DirectoryError::Credentials(format!("invalid key file: {}", e)))?;

        if let Some(kind) = file.key_type.as_deref() {
            if kind != "service_account" {
                return Err(DirectoryError::Credentials(format!(
                    "expected a service_account key, got {kind}"
                )));
            }
        }

        Ok(Self {
            client_email: file.client_email,
            private_key_id: file.private_key_id,
            token_uri: file
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            private_key: SecretString::from(file.private_key),
        })
    }

    /// Override the token endpoint (tests, private endpoints).
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[allow(dead_code)]
    token_type: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Access-token cache for one (service account, impersonated admin) pair.
pub struct TokenCache {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    subject: String,
    http_client: reqwest::Client,
    cached_token: RwLock<Option<CachedToken>>,
    grace_period: Duration,
}

impl TokenCache {
    /// Create a cache that impersonates `subject` with the read-only group scopes.
    ///
    /// Fails if the private key is not a valid RSA PEM.
    pub fn new(key: ServiceAccountKey, subject: impl Into<String>) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
            .map_err(|e| DirectoryError::Credentials(format!("invalid private key: {}", e)))?;

        Ok(Self {
            key,
            encoding_key,
            subject: subject.into(),
            http_client: reqwest::Client::new(),
            cached_token: RwLock::new(None),
            grace_period: Duration::minutes(5),
        })
    }

    /// Get a valid access token, refreshing if necessary.
    #[instrument(skip(self), fields(subject = %self.subject))]
    pub async fn get_token(&self) -> Result<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("Refreshing directory access token");
        let new_token = self.acquire_token().await?;

        let mut cache = self.cached_token.write().await;
        *cache = Some(new_token.clone());

        Ok(new_token.access_token)
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }

    fn build_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            sub: &self.subject,
            scope: READONLY_SCOPES.join(" "),
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| DirectoryError::Credentials(format!("failed to sign assertion: {}", e)))
    }

    async fn acquire_token(&self) -> Result<CachedToken> {
        let assertion = self.build_assertion(Utc::now())?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .http_client
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| DirectoryError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Auth(format!(
                "token request failed with status {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::Auth(format!("failed to parse token response: {}", e)))?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);
        debug!(%expires_at, "Acquired directory access token");

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}
