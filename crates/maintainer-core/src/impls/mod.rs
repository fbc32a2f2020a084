//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **GithubRepository**: GitHub REST API（本番用）
//! - **InMemoryRepository**: fixture で動くテスト用の repository

pub mod github;
pub mod inmem_repository;

// 主要な型を再エクスポート
pub use self::github::GithubRepository;
pub use self::inmem_repository::InMemoryRepository;
