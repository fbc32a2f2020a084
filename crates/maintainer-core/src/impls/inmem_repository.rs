//! InMemoryRepository - テスト用の RegistryRepository
//!
//! # 学習ポイント
//! - builder スタイルで fixture を組み立てる（`with_*`）
//! - builder 中は `&mut self` なので lock せずに `Mutex::get_mut` で書き換える
//! - apply_change は repo の中身を変えず、適用された ChangeRequest を記録するだけ
//!   （本物の GitHub でも PR はマージされるまで default branch に影響しない）

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::ChangeRequest;
use crate::domain::stack::format_last_modified;
use crate::ports::{
    OwnersFile, RegistryRepository, RepoError, StackFile, is_ownership_file, is_stack_file,
};

#[derive(Debug, Clone)]
struct StoredFile {
    content: String,
    sha: String,
    last_modified: Option<String>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    /// path 順に並ぶ（BTreeMap）ので一覧の順序が安定する
    files: BTreeMap<String, StoredFile>,
    branches: BTreeSet<String>,
    /// この path への apply_change は失敗させる
    failing_paths: BTreeSet<String>,
    reject_credentials: bool,
    applied: Vec<ChangeRequest>,
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<InMemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// ファイルを追加。`last_modified` が None なら commit 履歴なし扱い
    pub fn with_file(
        mut self,
        path: &str,
        content: &str,
        sha: &str,
        last_modified: Option<&str>,
    ) -> Self {
        self.state_mut().files.insert(
            path.to_string(),
            StoredFile {
                content: content.to_string(),
                sha: sha.to_string(),
                last_modified: last_modified.map(str::to_string),
            },
        );
        self
    }

    pub fn with_branch(mut self, branch: &str) -> Self {
        self.state_mut().branches.insert(branch.to_string());
        self
    }

    pub fn failing_on(mut self, path: &str) -> Self {
        self.state_mut().failing_paths.insert(path.to_string());
        self
    }

    pub fn rejecting_credentials(mut self) -> Self {
        self.state_mut().reject_credentials = true;
        self
    }

    /// 適用された変更（適用順）
    pub async fn applied(&self) -> Vec<ChangeRequest> {
        self.state.lock().await.applied.clone()
    }

    pub async fn branches(&self) -> Vec<String> {
        self.state.lock().await.branches.iter().cloned().collect()
    }

    fn state_mut(&mut self) -> &mut InMemoryState {
        self.state.get_mut()
    }
}

#[async_trait]
impl RegistryRepository for InMemoryRepository {
    async fn authenticate(&self) -> Result<(), RepoError> {
        if self.state.lock().await.reject_credentials {
            return Err(RepoError::Authentication("bad credentials".into()));
        }
        Ok(())
    }

    async fn list_artifact_files(&self, root: &str) -> Result<Vec<StackFile>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .files
            .iter()
            .filter(|(path, _)| is_stack_file(path, root))
            .map(|(path, file)| StackFile {
                path: path.clone(),
                sha: file.sha.clone(),
            })
            .collect())
    }

    async fn list_ownership_files(&self, root: &str) -> Result<Vec<OwnersFile>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .files
            .iter()
            .filter(|(path, _)| is_ownership_file(path, root))
            .map(|(path, file)| OwnersFile {
                path: path.clone(),
                content: file.content.clone(),
            })
            .collect())
    }

    async fn fetch_content(&self, path: &str) -> Result<String, RepoError> {
        let state = self.state.lock().await;
        state
            .files
            .get(path)
            .map(|file| file.content.clone())
            .ok_or_else(|| RepoError::NotFound(path.to_string()))
    }

    async fn fetch_last_modified(&self, path: &str) -> Result<String, RepoError> {
        let state = self.state.lock().await;
        let file = state
            .files
            .get(path)
            .ok_or_else(|| RepoError::NotFound(path.to_string()))?;
        Ok(file
            .last_modified
            .clone()
            .unwrap_or_else(|| format_last_modified(Utc::now())))
    }

    async fn branch_exists(&self, branch: &str) -> Result<bool, RepoError> {
        Ok(self.state.lock().await.branches.contains(branch))
    }

    async fn apply_change(&self, change: &ChangeRequest) -> Result<(), RepoError> {
        let mut state = self.state.lock().await;
        if state.branches.contains(&change.branch_name) {
            return Err(RepoError::BranchAlreadyExists(change.branch_name.clone()));
        }
        if state.failing_paths.contains(&change.target_path) {
            return Err(RepoError::Remote {
                status: 500,
                message: format!("injected failure for {}", change.target_path),
            });
        }
        match state.files.get(&change.target_path) {
            None => return Err(RepoError::NotFound(change.target_path.clone())),
            Some(file) if file.sha != change.content_hash => {
                return Err(RepoError::Remote {
                    status: 409,
                    message: format!("{} does not match {}", change.content_hash, file.sha),
                });
            }
            Some(_) => {}
        }

        state.branches.insert(change.branch_name.clone());
        state.applied.push(change.clone());
        Ok(())
    }
}
