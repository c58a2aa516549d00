// Mock implementations for testing
//
// Provides an in-memory directory that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use directory_client::Member;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::BaseDirectory;

// =============================================================================
// Mock Directory
// =============================================================================

#[derive(Clone)]
enum GroupResponse {
    Members(Vec<Member>),
    Error(String),
}

/// In-memory directory keyed by group email.
///
/// Unknown groups answer with a not-found error, the same way the real
/// directory does.
#[derive(Clone, Default)]
pub struct MockDirectory {
    groups: Arc<Mutex<HashMap<String, GroupResponse>>>,
    calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group with its immediate members
    pub fn with_group(self, group: &str, members: Vec<Member>) -> Self {
        self.groups
            .lock()
            .unwrap()
            .insert(group.to_string(), GroupResponse::Members(members));
        self
    }

    /// Make lookups of `group` fail with `message`
    pub fn with_error(self, group: &str, message: &str) -> Self {
        self.groups
            .lock()
            .unwrap()
            .insert(group.to_string(), GroupResponse::Error(message.to_string()));
        self
    }

    /// Delay every lookup (for timeout and overlap tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get every group that was looked up, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of lookups for one group
    pub fn call_count(&self, group: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.as_str() == group)
            .count()
    }
}

#[async_trait]
impl BaseDirectory for MockDirectory {
    async fn list_members(&self, group: &str) -> Result<Vec<Member>> {
        self.calls.lock().unwrap().push(group.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.groups.lock().unwrap().get(group).cloned();
        match response {
            Some(GroupResponse::Members(members)) => Ok(members),
            Some(GroupResponse::Error(message)) => Err(anyhow::anyhow!("{}", message)),
            None => Err(anyhow::anyhow!("Group not found: {}", group)),
        }
    }
}
