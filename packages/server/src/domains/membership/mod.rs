//! Directory membership: nested group expansion and de-duplication.

pub mod dedup;
pub mod resolver;

pub use dedup::dedup_by_email;
pub use resolver::{resolve_group, LookupFailure, Resolution};
