//! Publish - ChangeRequest を PR にする
//!
//! # ルール
//! - 1 run で作る PR は `limit` 件まで（超えた分は次の run に回す）
//! - branch がもう存在する = 前の run で処理済み → info を出して skip
//! - 1 件の失敗で止めない（warn を出して次へ）

use tracing::{info, warn};

use super::summary::RunSummary;
use crate::domain::ChangeRequest;
use crate::ports::{RegistryRepository, RepoError};

/// What happened to one change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Created,
    AlreadyExists,
    Failed(String),
}

pub async fn publish_changes<R>(
    repo: &R,
    changes: &[ChangeRequest],
    limit: usize,
    summary: &mut RunSummary,
) where
    R: RegistryRepository + ?Sized,
{
    for (index, change) in changes.iter().enumerate() {
        if summary.prs_created >= limit {
            warn!(limit, "PR creation limit is reached. Skipping");
            summary.skipped_limit += changes.len() - index;
            break;
        }

        match publish_one(repo, change).await {
            PublishOutcome::Created => summary.prs_created += 1,
            PublishOutcome::AlreadyExists => {
                info!(branch = %change.branch_name, "branch already exists. Skipping pr");
                summary.skipped_existing += 1;
            }
            PublishOutcome::Failed(reason) => {
                warn!(path = %change.target_path, "failed to create pr: {reason}");
                summary.failed += 1;
            }
        }
    }
}

pub async fn publish_one<R>(repo: &R, change: &ChangeRequest) -> PublishOutcome
where
    R: RegistryRepository + ?Sized,
{
    match repo.branch_exists(&change.branch_name).await {
        Ok(true) => return PublishOutcome::AlreadyExists,
        Ok(false) => {}
        Err(err) => return PublishOutcome::Failed(err.to_string()),
    }

    match repo.apply_change(change).await {
        Ok(()) => PublishOutcome::Created,
        // someone else created it between the check and the write
        Err(RepoError::BranchAlreadyExists(_)) => PublishOutcome::AlreadyExists,
        Err(err) => PublishOutcome::Failed(err.to_string()),
    }
}
