//! Config - 環境変数からの設定読み込み
//!
//! 起動時に 1 回だけ組み立てて、参照で各所に渡します。
//! `.env` があれば dotenvy で先に読み込みます（なくてもエラーにしない）。

use std::fmt;

use thiserror::Error;

use crate::domain::Limits;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REGISTRY_REPO: &str = "devfile/registry";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_STACKS_DIR: &str = "stacks";
pub const DEFAULT_DEPRECATION_DAYS: u32 = 365;
pub const DEFAULT_REMOVAL_DAYS: u32 = 365;
pub const DEFAULT_PR_CREATION_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' is not a non-negative integer")]
    InvalidInteger { key: &'static str, value: String },

    #[error("invalid value for REGISTRY_REPO: '{0}' (expected owner/name)")]
    InvalidRepository(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct MaintainerConfig {
    pub github_token: String,
    pub api_url: String,
    /// `owner/name`
    pub registry_repo: String,
    pub default_branch: String,
    pub stacks_dir: String,
    pub limits: Limits,
    /// Max pull requests opened per run.
    pub pr_creation_limit: u32,
    pub debug: bool,
    /// Evaluate and report, never touch the repository.
    pub dry_run: bool,
}

impl MaintainerConfig {
    /// `.env` → process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let registry_repo = text("REGISTRY_REPO", DEFAULT_REGISTRY_REPO);
        if !is_repo_slug(&registry_repo) {
            return Err(ConfigError::InvalidRepository(registry_repo));
        }

        Ok(Self {
            github_token: lookup("GITHUB_TOKEN").unwrap_or_default().trim().to_string(),
            api_url: text("GITHUB_API_URL", DEFAULT_API_URL),
            registry_repo,
            default_branch: text("DEFAULT_BRANCH", DEFAULT_BRANCH),
            stacks_dir: text("STACKS_DIR", DEFAULT_STACKS_DIR)
                .trim_end_matches('/')
                .to_string(),
            limits: Limits::new(
                read_u32(&lookup, "DEPRECATION_INACTIVITY_LIMIT", DEFAULT_DEPRECATION_DAYS)?,
                read_u32(&lookup, "REMOVAL_DEPRECATION_LIMIT", DEFAULT_REMOVAL_DAYS)?,
            ),
            pr_creation_limit: read_u32(&lookup, "PR_CREATION_LIMIT", DEFAULT_PR_CREATION_LIMIT)?,
            debug: read_flag(&lookup, "DEBUG_MODE")?,
            dry_run: read_flag(&lookup, "DRY_RUN")?,
        })
    }
}

impl Default for MaintainerConfig {
    fn default() -> Self {
        Self {
            github_token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            registry_repo: DEFAULT_REGISTRY_REPO.to_string(),
            default_branch: DEFAULT_BRANCH.to_string(),
            stacks_dir: DEFAULT_STACKS_DIR.to_string(),
            limits: Limits::new(DEFAULT_DEPRECATION_DAYS, DEFAULT_REMOVAL_DAYS),
            pr_creation_limit: DEFAULT_PR_CREATION_LIMIT,
            debug: false,
            dry_run: false,
        }
    }
}

// token は出さない
impl fmt::Debug for MaintainerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.github_token.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("MaintainerConfig")
            .field("github_token", &token)
            .field("api_url", &self.api_url)
            .field("registry_repo", &self.registry_repo)
            .field("default_branch", &self.default_branch)
            .field("stacks_dir", &self.stacks_dir)
            .field("limits", &self.limits)
            .field("pr_creation_limit", &self.pr_creation_limit)
            .field("debug", &self.debug)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn read_u32<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_string()) {
        None => Ok(default),
        Some(value) if value.is_empty() => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidInteger { key, value }),
    }
}

/// Integer toggle: anything above zero turns it on.
fn read_flag<F>(lookup: &F, key: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_string()) {
        None => Ok(false),
        Some(value) if value.is_empty() => Ok(false),
        Some(value) => value
            .parse::<i64>()
            .map(|n| n > 0)
            .map_err(|_| ConfigError::InvalidInteger { key, value }),
    }
}

fn is_repo_slug(value: &str) -> bool {
    matches!(
        value.split_once('/'),
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/')
    )
}
