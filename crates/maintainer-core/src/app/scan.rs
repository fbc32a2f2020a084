//! Scan - repo から stack を集めて RegistryStack にする
//!
//! # フロー
//! 1. devfile と OWNERS を列挙（ここが失敗したら run は続けられない）
//! 2. devfile ごとに OWNERS を対応付け
//! 3. 本文・last modified を取得してパース
//! 4. 取得やパースに失敗した stack は warn を出して skip

use tracing::{debug, info, warn};

use crate::domain::{RawStack, RegistryStack};
use crate::ports::{OwnersFile, RegistryRepository, RepoError, StackFile};

/// Stacks ready for evaluation plus the number that had to be skipped.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub stacks: Vec<RegistryStack>,
    pub skipped: usize,
}

pub async fn collect_stacks<R>(repo: &R, stacks_dir: &str) -> Result<ScanReport, RepoError>
where
    R: RegistryRepository + ?Sized,
{
    let files = repo.list_artifact_files(stacks_dir).await?;
    let owners = repo.list_ownership_files(stacks_dir).await?;
    debug!(devfiles = files.len(), owners = owners.len(), "listed registry files");

    let mut report = ScanReport::default();
    for file in files {
        let owners_file = match_owners(&file.path, &owners);
        match fetch_stack(repo, file, owners_file, stacks_dir).await {
            Ok(stack) => report.stacks.push(stack),
            Err(reason) => {
                warn!("skipping stack: {reason}");
                report.skipped += 1;
            }
        }
    }

    info!("fetched {} stacks from repo", report.stacks.len());
    Ok(report)
}

async fn fetch_stack<R>(
    repo: &R,
    file: StackFile,
    owners: Option<&OwnersFile>,
    stacks_dir: &str,
) -> Result<RegistryStack, String>
where
    R: RegistryRepository + ?Sized,
{
    let raw_content = repo
        .fetch_content(&file.path)
        .await
        .map_err(|err| format!("{}: {err}", file.path))?;
    let last_modified = repo
        .fetch_last_modified(&file.path)
        .await
        .map_err(|err| format!("{}: {err}", file.path))?;

    let path = file.path.clone();
    RegistryStack::from_raw(
        RawStack {
            path: file.path,
            raw_content,
            last_modified,
            file_sha: file.sha,
            owners_content: owners.map(|o| o.content.clone()),
        },
        stacks_dir,
    )
    .map_err(|err| format!("{path}: {err}"))
}

/// The OWNERS file closest to `stack_path`: its directory must contain the
/// stack, and the deepest such directory wins.
pub fn match_owners<'a>(stack_path: &str, owners: &'a [OwnersFile]) -> Option<&'a OwnersFile> {
    owners
        .iter()
        .filter_map(|file| {
            let (dir, _) = file.path.rsplit_once('/')?;
            stack_path
                .starts_with(&format!("{dir}/"))
                .then_some((dir.len(), file))
        })
        .max_by_key(|(depth, _)| *depth)
        .map(|(_, file)| file)
}
