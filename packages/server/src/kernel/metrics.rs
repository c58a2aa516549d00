//! Prometheus metrics for sync operations.
//!
//! Two counter families carry the operational signal, both labelled by
//! operation category:
//! - `grafana_snitch_success_total{operation}`
//! - `grafana_snitch_errors_total{operation}`
//!
//! plus a pass duration histogram and a last-completed-pass timestamp gauge.

use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, gauge::Gauge, histogram::Histogram},
    registry::Registry,
};
use std::sync::atomic::AtomicU64;

/// Operation categories used as the `operation` label.
pub mod operation {
    pub const GET_ADMIN_CONFIG: &str = "get-admin-config";
    pub const GET_MEMBERS: &str = "get-members";
    pub const RESOLVE_GROUP: &str = "resolve-group";
    pub const SYNC_PASS: &str = "sync-pass";
    pub const SYNC_PASS_SKIPPED: &str = "sync-pass-skipped";
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OperationLabels {
    pub operation: String,
}

impl OperationLabels {
    fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
        }
    }
}

/// Central metrics registry that owns all metric families.
///
/// Wrapped in `Arc` and shared between the scheduler and the `/metrics` route.
pub struct MetricsRegistry {
    registry: Registry,
    success: Family<OperationLabels, Counter>,
    errors: Family<OperationLabels, Counter>,
    sync_duration_seconds: Histogram,
    last_sync_timestamp_seconds: Gauge<f64, AtomicU64>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let success = Family::<OperationLabels, Counter>::default();
        let errors = Family::<OperationLabels, Counter>::default();
        let sync_duration_seconds =
            Histogram::new([0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0].into_iter());
        let last_sync_timestamp_seconds = Gauge::<f64, AtomicU64>::default();

        registry.register(
            "grafana_snitch_success",
            "Cumulative number of role update operations",
            success.clone(),
        );
        registry.register(
            "grafana_snitch_errors",
            "Cumulative number of errors during role update operations",
            errors.clone(),
        );
        registry.register(
            "grafana_snitch_sync_duration_seconds",
            "Duration of completed sync passes",
            sync_duration_seconds.clone(),
        );
        registry.register(
            "grafana_snitch_last_sync_timestamp_seconds",
            "Unix time of the last completed sync pass",
            last_sync_timestamp_seconds.clone(),
        );

        Self {
            registry,
            success,
            errors,
            sync_duration_seconds,
            last_sync_timestamp_seconds,
        }
    }

    pub fn record_success(&self, operation: &str) {
        self.success
            .get_or_create(&OperationLabels::new(operation))
            .inc();
    }

    pub fn record_error(&self, operation: &str) {
        self.errors.get_or_create(&OperationLabels::new(operation)).inc();
    }

    pub fn record_pass(&self, duration_seconds: f64, finished_at_unix: f64) {
        self.sync_duration_seconds.observe(duration_seconds);
        self.last_sync_timestamp_seconds.set(finished_at_unix);
    }

    pub fn success_count(&self, operation: &str) -> u64 {
        self.success
            .get_or_create(&OperationLabels::new(operation))
            .get()
    }

    pub fn error_count(&self, operation: &str) -> u64 {
        self.errors.get_or_create(&OperationLabels::new(operation)).get()
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();
        prometheus_client::encoding::text::encode(&mut buf, &self.registry)?;
        Ok(buf)
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
