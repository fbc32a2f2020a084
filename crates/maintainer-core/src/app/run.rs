//! Maintainer - 1 回分のメンテナンス run
//!
//! # フロー
//! 1. authenticate（失敗したら何もせず終了）
//! 2. scan で stack を集める
//! 3. Decider で stack ごとに判定 → ChangeRequest
//! 4. publish で PR 化（dry run なら数えるだけ）
//! 5. RunSummary をログに出す

use tracing::{debug, info, warn};

use super::publish::publish_changes;
use super::scan::collect_stacks;
use super::summary::RunSummary;
use crate::config::MaintainerConfig;
use crate::domain::{ChangeRequest, Decider, RegistryStack};
use crate::error::MaintainerError;
use crate::ports::{Clock, RegistryRepository, RepoError};

pub struct Maintainer<R, D, C> {
    repo: R,
    decider: D,
    clock: C,
    stacks_dir: String,
    pr_creation_limit: usize,
    dry_run: bool,
}

impl<R, D, C> Maintainer<R, D, C>
where
    R: RegistryRepository,
    D: Decider,
    C: Clock,
{
    pub fn new(repo: R, decider: D, clock: C, config: &MaintainerConfig) -> Self {
        Self {
            repo,
            decider,
            clock,
            stacks_dir: config.stacks_dir.clone(),
            pr_creation_limit: config.pr_creation_limit as usize,
            dry_run: config.dry_run,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub async fn run(&self) -> Result<RunSummary, MaintainerError> {
        self.repo.authenticate().await.map_err(|err| match err {
            RepoError::Authentication(reason) => MaintainerError::Authentication(reason),
            other => MaintainerError::Authentication(other.to_string()),
        })?;

        let scan = collect_stacks(&self.repo, &self.stacks_dir)
            .await
            .map_err(MaintainerError::Listing)?;

        let Plan { changes, skipped } = self.plan(&scan.stacks);
        info!("{} PRs should be created", changes.len());

        let mut summary = RunSummary {
            stacks_fetched: scan.stacks.len(),
            stacks_skipped: scan.skipped + skipped,
            changes_planned: changes.len(),
            dry_run: self.dry_run,
            ..RunSummary::default()
        };

        if self.dry_run {
            for change in &changes {
                info!(branch = %change.branch_name, action = %change.kind(), "dry run: would open pr");
            }
        } else {
            publish_changes(&self.repo, &changes, self.pr_creation_limit, &mut summary).await;
        }

        summary.log();
        Ok(summary)
    }

    /// Evaluate every stack in fetch order.
    pub fn plan(&self, stacks: &[RegistryStack]) -> Plan {
        let now = self.clock.now();
        let mut plan = Plan::default();
        for stack in stacks {
            match self.decider.evaluate(stack, now) {
                Ok(Some(change)) => {
                    info!(
                        stack = %stack.name,
                        action = %change.kind(),
                        last_modified = %stack.last_modified,
                        "stack needs a lifecycle change"
                    );
                    plan.changes.push(change);
                }
                Ok(None) => debug!(
                    stack = %stack.name,
                    last_modified = %stack.last_modified,
                    "stack doesn't need any update"
                ),
                Err(err) => {
                    warn!(stack = %stack.name, "skipping stack: {err}");
                    plan.skipped += 1;
                }
            }
        }
        plan
    }
}

/// Change requests for one run, plus stacks whose change could not be built.
#[derive(Debug, Default)]
pub struct Plan {
    pub changes: Vec<ChangeRequest>,
    pub skipped: usize,
}
