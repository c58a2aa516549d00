//! Error types for the Directory API client.

use thiserror::Error;

/// Result type for directory client operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Directory client errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Service-account credential file missing, unreadable or malformed
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Token exchange rejected by the OAuth endpoint
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Group does not exist (or is invisible to the impersonated admin)
    #[error("Group not found: {0}")]
    NotFound(String),

    /// Caller lacks permission for the group (401/403)
    #[error("Access denied for {group}: {message}")]
    Forbidden { group: String, message: String },

    /// Any other non-2xx response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport or response decoding failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid client configuration (base URL, page size)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DirectoryError {
    /// True for 404 lookups.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::NotFound(_))
    }
}
