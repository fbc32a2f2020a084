//! Domain model (stack record, change request, decisions, devfile rewriting).
//!
//! ここにあるものはすべて純粋関数・不変データです（I/O なし）。
//! - stack: RegistryStack と生データのパース
//! - decision: Lifecycle / Decider / LifecycleDecider
//! - devfile: deprecate 用の devfile 書き換え
//! - change: ChangeRequest（repository に渡す変更指示）
//! - errors: StackError

pub mod change;
pub mod decision;
pub mod devfile;
pub mod errors;
pub mod stack;

pub use change::{ChangeAction, ChangeKind, ChangeRequest, branch_name};
pub use decision::{Decider, Lifecycle, LifecycleDecider, Limits, limit_reached};
pub use devfile::{DEPRECATED_TAG, transform};
pub use errors::StackError;
pub use stack::{
    RawStack, RegistryStack, derive_name, format_last_modified, parse_deprecated,
    parse_last_modified, parse_owners,
};
