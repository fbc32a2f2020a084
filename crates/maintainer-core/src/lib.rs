//! maintainer-core
//!
//! devfile レジストリの stack バージョンを定期的に棚卸しして、
//! 放置された stack を deprecate、deprecate 済みで放置された stack を削除する PR を作ります。
//!
//! # モジュール構成
//! - **domain**: RegistryStack, Decider, devfile 書き換え, ChangeRequest（純粋関数のみ）
//! - **ports**: 抽象化レイヤー（RegistryRepository, Clock）
//! - **impls**: 実装（GithubRepository, InMemoryRepository）
//! - **app**: run の組み立て（scan → decide → publish）
//! - **config**: 環境変数からの MaintainerConfig
//! - **observability**: tracing の初期化

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{Maintainer, RunSummary};
pub use config::{ConfigError, MaintainerConfig};
pub use error::MaintainerError;
