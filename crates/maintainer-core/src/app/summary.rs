//! RunSummary - 1 回の run の集計
//!
//! 途中で個別の失敗があっても、run の最後に必ずログに出します。

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Stacks parsed successfully.
    pub stacks_fetched: usize,
    /// Stacks skipped because their data could not be fetched or parsed.
    pub stacks_skipped: usize,
    /// Change requests produced by the decider.
    pub changes_planned: usize,
    pub prs_created: usize,
    /// Branch was already there; a previous run handled the stack.
    pub skipped_existing: usize,
    /// Left for a later run because of the per-run PR limit.
    pub skipped_limit: usize,
    pub failed: usize,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn log(&self) {
        info!(
            stacks_fetched = self.stacks_fetched,
            stacks_skipped = self.stacks_skipped,
            changes_planned = self.changes_planned,
            prs_created = self.prs_created,
            skipped_existing = self.skipped_existing,
            skipped_limit = self.skipped_limit,
            failed = self.failed,
            dry_run = self.dry_run,
            "created {} pull requests",
            self.prs_created
        );
    }
}
