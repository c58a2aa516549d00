// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Membership resolution lives in domains::membership and only sees these traits.
//
// Naming convention: Base* for trait names (e.g., BaseDirectory)

use anyhow::Result;
use async_trait::async_trait;
use directory_client::Member;

// =============================================================================
// Directory Trait (Infrastructure - group membership lookups)
// =============================================================================

#[async_trait]
pub trait BaseDirectory: Send + Sync {
    /// List the immediate members of a group (nested groups are not expanded)
    async fn list_members(&self, group: &str) -> Result<Vec<Member>>;
}
