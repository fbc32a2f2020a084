use thiserror::Error;

use crate::config::ConfigError;
use crate::ports::RepoError;

/// Errors that stop a whole run. Per-stack and per-PR problems never end up
/// here; they are logged and counted in the summary.
#[derive(Debug, Error)]
pub enum MaintainerError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("github authentication failed: {0}")]
    Authentication(String),

    #[error("cannot list registry stacks: {0}")]
    Listing(RepoError),

    #[error("cannot set up repository client: {0}")]
    Setup(RepoError),
}
