//! Errors - stack 1 件のパースで起きるエラー
//!
//! どれも「その stack だけ skip する」種類のエラーで、run 全体は止めません。

use thiserror::Error;

/// A stack version that could not be turned into a [`RegistryStack`].
///
/// [`RegistryStack`]: super::RegistryStack
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("malformed stack path '{0}': expected <dir>/devfile.yaml or <dir>/devfile.yml")]
    MalformedPath(String),

    #[error("malformed last-modified timestamp '{value}': {reason}")]
    MalformedTimestamp { value: String, reason: String },

    #[error("malformed devfile: {0}")]
    MalformedDefinition(String),
}

impl StackError {
    pub(crate) fn definition(err: impl std::fmt::Display) -> Self {
        Self::MalformedDefinition(err.to_string())
    }
}
