use anyhow::Context;
use tracing::{error, info};

use maintainer_core::domain::LifecycleDecider;
use maintainer_core::impls::GithubRepository;
use maintainer_core::observability;
use maintainer_core::ports::SystemClock;
use maintainer_core::{Maintainer, MaintainerConfig, MaintainerError};

/// 1 回分の run を実行して終了する（cron / GitHub Actions から呼ばれる想定）
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // (A) 設定。壊れていたらログを出して即終了
    let config = match MaintainerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            observability::init_tracing(false);
            error!("{err}");
            return Err(err).context("invalid configuration");
        }
    };
    observability::init_tracing(config.debug);
    info!(repo = %config.registry_repo, dry_run = config.dry_run, "starting registry maintenance");

    // (B) GitHub + 判定ロジックを組み立てる
    let repo = GithubRepository::new(&config).map_err(MaintainerError::Setup)?;
    let maintainer = Maintainer::new(
        repo,
        LifecycleDecider::new(config.limits),
        SystemClock,
        &config,
    );

    // (C) run。認証・一覧の失敗だけがここまで上がってくる
    let summary = match maintainer.run().await {
        Ok(summary) => summary,
        Err(err) => {
            error!("{err}");
            return Err(err.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
