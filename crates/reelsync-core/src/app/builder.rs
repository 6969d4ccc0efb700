//! AppBuilder - Config から本番用のドライバーを組み立てる
//!
//! # Fail-fast 設計
//! - Config::validate() で認証情報・batch_size・DB パスを確認
//! - SQLite を開いて `videos` のカラムを確認
//! - どれかが駄目なら BuildError を返し、アップロードは一件も始めない

use std::sync::Arc;

use crate::app::{BatchUploadDriver, Config};
use crate::domain::{ConfigError, PersistenceError};
use crate::impls::{SqliteVideoStore, VimeoUploader};
use crate::ports::{Clock, SystemClock};

/// 本番構成のドライバー
pub type SyncDriver = BatchUploadDriver<SqliteVideoStore, VimeoUploader>;

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot open video store: {0}")]
    Store(#[from] PersistenceError),

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// # 使用例
/// ```ignore
/// let mut driver = AppBuilder::new(config).build()?;
/// let report = driver.run().await?;
/// ```
pub struct AppBuilder {
    config: Config,
    clock: Arc<dyn Clock>,
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<SyncDriver, BuildError> {
        self.config.validate()?;

        let store = SqliteVideoStore::open(&self.config.db_path)?;
        let uploader = VimeoUploader::from_config(&self.config).map_err(BuildError::HttpClient)?;

        tracing::info!(
            db_path = %self.config.db_path.display(),
            batch_size = self.config.batch_size,
            api_base = %self.config.vimeo_api_base,
            "upload driver ready"
        );
        Ok(BatchUploadDriver::new(store, uploader, &self.config).with_clock(self.clock))
    }
}
