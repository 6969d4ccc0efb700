use reelsync_core::app::{AppBuilder, Config, telemetry};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // (A) .env があれば読む（無くてもよい）
    dotenvy::dotenv().ok();

    // (B) 設定を一度だけ読み、ログを初期化
    let config = Config::from_env()?;
    telemetry::init(config.log_file.as_deref())?;
    info!(?config, "configuration loaded");

    // (C) 起動時検証 + 組み立て（失敗したら一件もアップロードしない）
    let mut driver = AppBuilder::new(config).build().inspect_err(|e| {
        error!(error = %e, "startup failed");
    })?;

    // (D) pending が尽きるまで回す
    let report = driver.run().await.inspect_err(|e| {
        error!(error = %e, "run aborted");
    })?;

    let summary = serde_json::to_string(&report)?;
    info!(%summary, "finished");
    Ok(())
}
