//! Periodic sync: resolve every configured rule and record the outcome.

pub mod pass;
pub mod report;

pub use pass::run_sync_pass;
pub use report::{GroupOutcome, GroupRuleReport, ReportStore, SyncReport, UserRuleReport};
