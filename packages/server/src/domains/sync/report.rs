use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::common::OrgRole;
use crate::domains::membership::LookupFailure;

/// Result of one sync pass over every rule.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Grafana host the membership applies to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub groups: Vec<GroupRuleReport>,
    pub users: Vec<UserRuleReport>,
}

impl SyncReport {
    /// Group rules that failed outright or resolved only partially.
    pub fn degraded_rules(&self) -> usize {
        self.groups
            .iter()
            .filter(|rule| !rule.outcome.is_complete())
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupRuleReport {
    pub name: String,
    pub group: String,
    pub organization: String,
    pub role: OrgRole,
    #[serde(flatten)]
    pub outcome: GroupOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupOutcome {
    Resolved {
        /// False when some nested group could not be expanded
        complete: bool,
        member_count: usize,
        members: Vec<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        failures: Vec<LookupFailure>,
    },
    Failed {
        error: String,
    },
}

impl GroupOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, GroupOutcome::Resolved { complete: true, .. })
    }

    pub fn members(&self) -> &[String] {
        match self {
            GroupOutcome::Resolved { members, .. } => members,
            GroupOutcome::Failed { .. } => &[],
        }
    }
}

/// Directly configured user; passed through without a directory lookup.
#[derive(Debug, Clone, Serialize)]
pub struct UserRuleReport {
    pub name: String,
    pub email: String,
    pub organization: String,
    pub role: OrgRole,
}

/// Holds the most recent completed report for `/status`.
#[derive(Debug, Default)]
pub struct ReportStore {
    latest: RwLock<Option<SyncReport>>,
}

impl ReportStore {
    pub async fn latest(&self) -> Option<SyncReport> {
        self.latest.read().await.clone()
    }

    pub async fn publish(&self, report: SyncReport) {
        *self.latest.write().await = Some(report);
    }
}
