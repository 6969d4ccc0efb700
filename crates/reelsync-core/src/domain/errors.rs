//! Errors - エラー型と分類
//!
//! # 分類
//! - UploadError: アップロード側の失敗。ドライバーがその場で回収する（ログを残して次へ）
//! - PersistenceError: DB の読み書き失敗。回収しない（呼び出し元へ返す）
//! - ConfigError: 起動時の設定不備。実行を開始しない

use std::path::PathBuf;

use thiserror::Error;

use super::ids::VideoId;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("video file not found: {}", .0.display())]
    FileMissing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vimeo rejected {step} (status {status}): {body}")]
    Rejected {
        step: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected vimeo response during {step}: {detail}")]
    MalformedResponse { step: &'static str, detail: String },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("video {0} does not exist")]
    NotFound(VideoId),

    #[error("store schema is missing `{0}`")]
    MissingSchema(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("{0} must be set to a non-empty value")]
    MissingCredential(&'static str),

    #[error("BATCH_SIZE must be at least 1")]
    InvalidBatchSize,

    #[error("UPLOAD_CHUNK_BYTES must be at least 1")]
    InvalidChunkSize,

    #[error("database not found at {}", .0.display())]
    StoreNotFound(PathBuf),
}
