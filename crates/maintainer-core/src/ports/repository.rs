//! RegistryRepository port - レジストリ repo（GitHub）への窓口
//!
//! maintainer が repo に求めることはこの trait にすべて書いてあります。
//! 一覧・取得・変更の適用（branch → commit → PR）だけで、判定ロジックは持ちません。
//!
//! # 実装
//! - **GithubRepository**: GitHub REST API（本番用）
//! - **InMemoryRepository**: テスト・dry run 用

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ChangeRequest;
use crate::domain::stack::DEVFILE_NAMES;

/// A devfile found under the stacks dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFile {
    pub path: String,
    pub sha: String,
}

/// An OWNERS file below the stacks dir, with its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnersFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("branch {0} already exists")]
    BranchAlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("remote operation failed (status {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// RegistryRepository はレジストリ repo の読み書きを担当
///
/// # 設計原則
/// - 1 メソッド = 1 つの外部操作（リトライはしない）
/// - エラーの扱い（skip / abort）は呼び出し側（app）が決める
#[async_trait]
pub trait RegistryRepository: Send + Sync {
    /// 認証情報のチェック。run の最初に 1 回だけ呼ばれる
    async fn authenticate(&self) -> Result<(), RepoError>;

    /// `root` 以下の devfile.yaml / devfile.yml を再帰的に列挙
    async fn list_artifact_files(&self, root: &str) -> Result<Vec<StackFile>, RepoError>;

    /// `root` 以下の OWNERS を列挙（`root/OWNERS` 自体は除く）
    async fn list_ownership_files(&self, root: &str) -> Result<Vec<OwnersFile>, RepoError>;

    async fn fetch_content(&self, path: &str) -> Result<String, RepoError>;

    /// 最後にファイルを変更した commit の時刻（wire format）。履歴がなければ現在時刻
    async fn fetch_last_modified(&self, path: &str) -> Result<String, RepoError>;

    async fn branch_exists(&self, branch: &str) -> Result<bool, RepoError>;

    /// branch 作成 → 更新/削除 commit → default branch 向け PR
    async fn apply_change(&self, change: &ChangeRequest) -> Result<(), RepoError>;
}

/// `path` is a devfile somewhere below `root`.
pub fn is_stack_file(path: &str, root: &str) -> bool {
    path.starts_with(&format!("{}/", root.trim_end_matches('/')))
        && DEVFILE_NAMES
            .iter()
            .any(|name| path.ends_with(&format!("/{name}")))
}

/// `path` is an OWNERS file strictly below `root`. `root/OWNERS` covers every
/// stack and is not a per-stack owners file.
pub fn is_ownership_file(path: &str, root: &str) -> bool {
    let root = root.trim_end_matches('/');
    let Some(relative) = path.strip_prefix(root).and_then(|p| p.strip_prefix('/')) else {
        return false;
    };
    match relative.rsplit_once('/') {
        Some((_, file)) => file.eq_ignore_ascii_case("owners"),
        None => false,
    }
}
