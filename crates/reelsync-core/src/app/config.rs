//! Config - 実行設定
//!
//! 環境変数は起動時に一度だけ読み、以降はこの構造体を明示的に渡します。
//! コアのコードは `std::env` を直接読みません。

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::ConfigError;

const DEFAULT_BATCH_SIZE: usize = 10;
const DEFAULT_API_BASE: &str = "https://api.vimeo.com";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;
const DEFAULT_UPLOAD_CHUNK_BYTES: usize = 128 * 1024 * 1024;

/// 環境変数名は大文字（`CLIENT_ID` → `client_id`）
#[derive(Clone, Deserialize)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    pub db_path: PathBuf,

    /// 1 回の fetch で取る pending の件数
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_api_base")]
    pub vimeo_api_base: String,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// tus の PATCH 1 回あたりのバイト数
    #[serde(default = "default_upload_chunk_bytes")]
    pub upload_chunk_bytes: usize,

    /// 設定されていればログをこのファイルに追記する
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_upload_chunk_bytes() -> usize {
    DEFAULT_UPLOAD_CHUNK_BYTES
}

impl Config {
    /// プロセスの環境変数から読む（`.env` の読み込みは呼び出し側）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// 任意の (KEY, VALUE) 列から読む
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter(vars)?)
    }

    /// 起動前チェック（Fail-fast）
    ///
    /// - 認証情報が空でない
    /// - batch_size / upload_chunk_bytes が 1 以上
    /// - db_path が存在する
    pub fn validate(&self) -> Result<(), ConfigError> {
        let credentials = [
            ("CLIENT_ID", &self.client_id),
            ("CLIENT_SECRET", &self.client_secret),
            ("ACCESS_TOKEN", &self.access_token),
        ];
        for (name, value) in credentials {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingCredential(name));
            }
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        if self.upload_chunk_bytes == 0 {
            return Err(ConfigError::InvalidChunkSize);
        }
        if !self.db_path.is_file() {
            return Err(ConfigError::StoreNotFound(self.db_path.clone()));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn for_tests(db_path: impl Into<PathBuf>, batch_size: usize) -> Self {
        Self {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            access_token: "token".to_string(),
            db_path: db_path.into(),
            batch_size,
            vimeo_api_base: default_api_base(),
            http_timeout_secs: 5,
            upload_chunk_bytes: 1024,
            log_file: None,
        }
    }
}

// 認証情報をログに出さない
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("db_path", &self.db_path)
            .field("batch_size", &self.batch_size)
            .field("vimeo_api_base", &self.vimeo_api_base)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("upload_chunk_bytes", &self.upload_chunk_bytes)
            .field("log_file", &self.log_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "secret"),
            ("ACCESS_TOKEN", "token"),
            ("DB_PATH", "/tmp/videos.db"),
        ]
    }

    #[test]
    fn reads_required_vars_and_applies_defaults() {
        let config = Config::from_vars(vars(&required())).unwrap();

        assert_eq!(config.client_id, "id");
        assert_eq!(config.db_path, PathBuf::from("/tmp/videos.db"));
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.vimeo_api_base, "https://api.vimeo.com");
        assert_eq!(config.http_timeout_secs, 300);
        assert_eq!(config.upload_chunk_bytes, 128 * 1024 * 1024);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn optional_vars_override_defaults() {
        let mut pairs = required();
        pairs.push(("BATCH_SIZE", "2"));
        pairs.push(("LOG_FILE", "video_processing.log"));
        let config = Config::from_vars(vars(&pairs)).unwrap();

        assert_eq!(config.batch_size, 2);
        assert_eq!(config.log_file, Some(PathBuf::from("video_processing.log")));
    }

    #[test]
    fn missing_db_path_is_an_env_error() {
        let pairs: Vec<_> = required()
            .into_iter()
            .filter(|(k, _)| *k != "DB_PATH")
            .collect();

        let err = Config::from_vars(vars(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Env(_)));
    }

    #[rstest]
    #[case::client_id("CLIENT_ID")]
    #[case::client_secret("CLIENT_SECRET")]
    #[case::access_token("ACCESS_TOKEN")]
    fn validate_rejects_blank_credentials(#[case] blank: &'static str) {
        let db = tempfile::NamedTempFile::new().unwrap();
        let mut config = Config::for_tests(db.path(), 10);
        match blank {
            "CLIENT_ID" => config.client_id = " ".to_string(),
            "CLIENT_SECRET" => config.client_secret = String::new(),
            _ => config.access_token = String::new(),
        }

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(name) if name == blank));
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let db = tempfile::NamedTempFile::new().unwrap();
        let config = Config::for_tests(db.path(), 0);

        assert!(matches!(config.validate(), Err(ConfigError::InvalidBatchSize)));
    }

    #[test]
    fn validate_rejects_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::for_tests(dir.path().join("videos.db"), 10);

        assert!(matches!(config.validate(), Err(ConfigError::StoreNotFound(_))));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = Config::for_tests("/tmp/videos.db", 10);
        let shown = format!("{config:?}");

        assert!(shown.contains("<redacted>"));
        assert!(!shown.contains("secret\""));
        assert!(!shown.contains("\"token\""));
    }
}
