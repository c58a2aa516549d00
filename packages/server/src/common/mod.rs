// Common types shared across the application

pub mod rules;

pub use rules::{OrgRole, Rule, RuleConfigs, RulesError, SyncConfig};
