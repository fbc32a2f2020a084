//! Change request: the output of a lifecycle decision.
//!
//! A change request is consumed exactly once by the repository, which turns
//! it into branch + commit + pull request.

use std::fmt;

use serde::Serialize;

/// Prefix shared by every branch the maintainer creates.
pub const BRANCH_PREFIX: &str = "devfile_maintainer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Deprecate,
    Remove,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Deprecate => "deprecate",
            ChangeKind::Remove => "remove",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to the devfile. Only a deprecation carries new content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeAction {
    Deprecate { updated_content: String },
    Remove,
}

impl ChangeAction {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeAction::Deprecate { .. } => ChangeKind::Deprecate,
            ChangeAction::Remove => ChangeKind::Remove,
        }
    }

    pub fn updated_content(&self) -> Option<&str> {
        match self {
            ChangeAction::Deprecate { updated_content } => Some(updated_content),
            ChangeAction::Remove => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRequest {
    pub action: ChangeAction,
    pub stack_name: String,
    pub target_path: String,

    /// Blob sha the update/delete is conditioned on.
    pub content_hash: String,

    pub branch_name: String,
    pub commit_message: String,
    pub title: String,
    pub description: String,
}

impl ChangeRequest {
    pub fn kind(&self) -> ChangeKind {
        self.action.kind()
    }
}

/// Branch used for `kind` on stack `stack_name`.
///
/// Depends on nothing else, so a second run finds the branch of the first one
/// and skips the stack.
pub fn branch_name(kind: ChangeKind, stack_name: &str) -> String {
    format!("{BRANCH_PREFIX}/{kind}-{}", stack_name.replace('/', "-"))
}
