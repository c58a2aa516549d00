//! One sync pass: resolve every group rule and publish the result.
//!
//! The pass stops at resolved membership. Granting or revoking Grafana roles
//! from it needs a reconciliation policy that is not defined yet.

use chrono::Utc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::common::Rule;
use crate::domains::membership::{dedup_by_email, resolve_group};
use crate::domains::sync::{GroupOutcome, GroupRuleReport, SyncReport, UserRuleReport};
use crate::kernel::{operation, ServerDeps};

/// Run a full pass over the configured rules.
///
/// Per-rule failures are isolated: a group that cannot be resolved is
/// reported as failed and the pass moves on to the next rule.
#[instrument(skip(deps))]
pub async fn run_sync_pass(deps: &ServerDeps) -> SyncReport {
    let started_at = Utc::now();
    let timer = Instant::now();
    let rules = &deps.rules.rules;

    info!(
        groups = rules.groups.len(),
        users = rules.users.len(),
        "Starting sync pass"
    );

    let mut groups = Vec::with_capacity(rules.groups.len());
    for rule in &rules.groups {
        let outcome = resolve_rule(deps, rule).await;
        groups.push(GroupRuleReport {
            name: rule.name.clone(),
            group: rule.email.clone(),
            organization: rule.organization.clone(),
            role: rule.role,
            outcome,
        });
    }

    let users = rules
        .users
        .iter()
        .map(|rule| UserRuleReport {
            name: rule.name.clone(),
            email: rule.email.clone(),
            organization: rule.organization.clone(),
            role: rule.role,
        })
        .collect();

    let finished_at = Utc::now();
    let elapsed = timer.elapsed();
    let report = SyncReport {
        started_at,
        finished_at,
        duration_ms: elapsed.as_millis() as u64,
        mode: deps.rules.mode.clone(),
        target: deps.grafana.as_ref().map(|target| target.host.clone()),
        groups,
        users,
    };

    deps.metrics.record_success(operation::SYNC_PASS);
    deps.metrics
        .record_pass(elapsed.as_secs_f64(), finished_at.timestamp() as f64);

    info!(
        duration_ms = report.duration_ms,
        degraded = report.degraded_rules(),
        "Sync pass finished"
    );

    deps.reports.publish(report.clone()).await;
    report
}

async fn resolve_rule(deps: &ServerDeps, rule: &Rule) -> GroupOutcome {
    match resolve_group(deps.directory.as_ref(), &rule.email).await {
        Ok(resolution) => {
            for failure in &resolution.failures {
                warn!(
                    rule = %rule.name,
                    group = %failure.group,
                    parent = %failure.parent,
                    "Partial resolution: nested group skipped"
                );
                deps.metrics.record_error(operation::GET_MEMBERS);
            }
            deps.metrics.record_success(operation::RESOLVE_GROUP);

            let complete = resolution.is_complete();
            let members: Vec<String> = dedup_by_email(resolution.members)
                .into_iter()
                .map(|member| member.email)
                .collect();

            info!(
                rule = %rule.name,
                group = %rule.email,
                members = members.len(),
                complete,
                "Group rule resolved"
            );

            GroupOutcome::Resolved {
                complete,
                member_count: members.len(),
                members,
                failures: resolution.failures,
            }
        }
        Err(e) => {
            error!(rule = %rule.name, group = %rule.email, error = %format!("{:#}", e), "Unable to resolve group rule");
            deps.metrics.record_error(operation::GET_MEMBERS);
            deps.metrics.record_error(operation::RESOLVE_GROUP);
            GroupOutcome::Failed {
                error: format!("{:#}", e),
            }
        }
    }
}
