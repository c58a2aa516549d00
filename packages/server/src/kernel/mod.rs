//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod metrics;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use deps::{DirectoryAdapter, ServerDeps};
pub use metrics::{operation, MetricsRegistry};
pub use scheduled_tasks::{start_scheduler, PassOutcome, SyncScheduler};
pub use test_dependencies::MockDirectory;
pub use traits::*;
