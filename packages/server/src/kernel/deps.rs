//! Server dependencies (using traits for testability)
//!
//! This module provides the dependency container shared by the scheduler and
//! the HTTP routes. External services sit behind trait abstractions.

use anyhow::Result;
use async_trait::async_trait;
use directory_client::{DirectoryClient, Member};
use std::sync::Arc;

use crate::common::SyncConfig;
use crate::config::GrafanaTarget;
use crate::domains::sync::ReportStore;
use crate::kernel::{BaseDirectory, MetricsRegistry};

// =============================================================================
// DirectoryClient Adapter (implements BaseDirectory trait)
// =============================================================================

/// Wrapper around DirectoryClient that implements BaseDirectory trait
pub struct DirectoryAdapter(pub DirectoryClient);

impl DirectoryAdapter {
    pub fn new(client: DirectoryClient) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseDirectory for DirectoryAdapter {
    async fn list_members(&self, group: &str) -> Result<Vec<Member>> {
        self.0.list_members(group).await.map_err(Into::into)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Dependencies for sync passes and routes
#[derive(Clone)]
pub struct ServerDeps {
    pub directory: Arc<dyn BaseDirectory>,
    pub rules: Arc<SyncConfig>,
    pub metrics: Arc<MetricsRegistry>,
    pub reports: Arc<ReportStore>,
    pub grafana: Option<GrafanaTarget>,
}

impl ServerDeps {
    pub fn new(
        directory: Arc<dyn BaseDirectory>,
        rules: SyncConfig,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            directory,
            rules: Arc::new(rules),
            metrics,
            reports: Arc::new(ReportStore::default()),
            grafana: None,
        }
    }

    pub fn with_grafana(mut self, target: GrafanaTarget) -> Self {
        self.grafana = Some(target);
        self
    }
}
