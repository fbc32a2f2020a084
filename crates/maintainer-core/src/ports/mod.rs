//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」です。外部システム（GitHub, 時計）への
//! インターフェースだけを定義し、実装は impls に置きます。

pub mod clock;
pub mod repository;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::repository::{
    OwnersFile, RegistryRepository, RepoError, StackFile, is_ownership_file, is_stack_file,
};
