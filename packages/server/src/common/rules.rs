//! Rules document: which directory groups and users map to which Grafana roles.
//!
//! ```yaml
//! mode: sync
//! rules:
//!   groups:
//!     - name: engineering
//!       email: eng@example.com
//!       organization: Main Org.
//!       role: Editor
//!   users:
//!     - name: on-call lead
//!       email: lead@example.com
//!       organization: Main Org.
//!       role: Admin
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("unable to read rules document {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse rules document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{category} rule #{index} ({name}) has an empty email")]
    MissingEmail {
        category: &'static str,
        index: usize,
        name: String,
    },
}

/// Grafana organization role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrgRole {
    /// Org member without dashboard access
    None,
    Viewer,
    Editor,
    Admin,
}

/// One mapping from a directory identity (group or user) to a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub organization: String,
    pub role: OrgRole,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfigs {
    #[serde(default)]
    pub groups: Vec<Rule>,
    #[serde(default)]
    pub users: Vec<Rule>,
}

/// Top-level rules document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub rules: RuleConfigs,
    #[serde(default)]
    pub mode: Option<String>,
}

impl SyncConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| RulesError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, RulesError> {
        let config: SyncConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), RulesError> {
        let categories = [("group", &self.rules.groups), ("user", &self.rules.users)];
        for (category, rules) in categories {
            for (index, rule) in rules.iter().enumerate() {
                if rule.email.trim().is_empty() {
                    return Err(RulesError::MissingEmail {
                        category,
                        index,
                        name: rule.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
