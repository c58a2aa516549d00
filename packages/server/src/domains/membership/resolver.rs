//! Flatten nested directory groups into their terminal members.
//!
//! The walk is depth-first over an explicit stack of member iterators, so the
//! output order is the order a recursive expansion would produce, without
//! call-stack growth. Every group is fetched at most once per resolution;
//! this both terminates cyclic memberships and avoids refetching a group
//! reachable through several parents.

use anyhow::{Context, Result};
use directory_client::Member;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

use crate::kernel::BaseDirectory;

/// A nested group that could not be expanded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupFailure {
    pub group: String,
    /// Group whose member list referenced `group`
    pub parent: String,
    pub error: String,
}

/// Terminal members of a group, plus whatever could not be expanded.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub group: String,
    pub members: Vec<Member>,
    pub failures: Vec<LookupFailure>,
    /// Group references skipped because the group was already expanded
    pub revisits: usize,
}

impl Resolution {
    /// True when every nested group was expanded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Frame {
    group: String,
    entries: std::vec::IntoIter<Member>,
}

/// Resolve `group` to the flat list of its terminal members.
///
/// A failure to list `group` itself is an error. Failures on nested groups
/// are collected in [`Resolution::failures`] and the walk continues.
#[instrument(skip(directory))]
pub async fn resolve_group(directory: &dyn BaseDirectory, group: &str) -> Result<Resolution> {
    let top = directory
        .list_members(group)
        .await
        .with_context(|| format!("Unable to get members of {}", group))?;

    let mut resolution = Resolution {
        group: group.to_string(),
        ..Default::default()
    };
    let mut visited: HashSet<String> = HashSet::from([group.to_string()]);
    let mut stack = vec![Frame {
        group: group.to_string(),
        entries: top.into_iter(),
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(entry) = frame.entries.next() else {
            stack.pop();
            continue;
        };

        if !entry.is_group() {
            resolution.members.push(entry);
            continue;
        }

        if !visited.insert(entry.email.clone()) {
            debug!(group = %entry.email, parent = %frame.group, "Group already expanded, skipping");
            resolution.revisits += 1;
            continue;
        }

        let parent = frame.group.clone();
        match directory.list_members(&entry.email).await {
            Ok(nested) => stack.push(Frame {
                group: entry.email,
                entries: nested.into_iter(),
            }),
            Err(e) => {
                warn!(group = %entry.email, parent = %parent, error = %e, "Unable to expand nested group");
                resolution.failures.push(LookupFailure {
                    group: entry.email,
                    parent,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    debug!(
        members = resolution.members.len(),
        failures = resolution.failures.len(),
        revisits = resolution.revisits,
        "Group resolved"
    );
    Ok(resolution)
}
