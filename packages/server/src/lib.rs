// grafana-snitch - service core
//
// Resolves Google Workspace group membership (including nested groups) for
// the configured Grafana role rules, on a schedule, and exposes health,
// metrics and the latest pass report over HTTP.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
