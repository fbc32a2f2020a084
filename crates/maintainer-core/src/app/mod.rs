//! App - アプリケーション層
//!
//! ports と domain を組み合わせて 1 回分の run を実装します。
//!
//! # 主要コンポーネント
//! - **Maintainer**: run 全体（authenticate → scan → decide → publish）
//! - **scan**: stack の収集と OWNERS の対応付け
//! - **publish**: ChangeRequest の PR 化（件数上限・既存 branch の skip）
//! - **RunSummary**: run の集計

pub mod publish;
pub mod run;
pub mod scan;
pub mod summary;

// 主要な型を再エクスポート
pub use self::publish::{PublishOutcome, publish_changes};
pub use self::run::{Maintainer, Plan};
pub use self::scan::{ScanReport, collect_stacks, match_owners};
pub use self::summary::RunSummary;
