//! Video - `videos` テーブルの 1 行と、アップロード要求
//!
//! # ライフサイクル
//! - 外部で作成される（このシステムの実行前）
//! - アップロード成功時に一度だけ `hosted_link` が書き込まれる
//! - 削除はしない

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ids::VideoId;

/// HostedLink は Vimeo が返した公開 URL
///
/// 空文字列は「未処理」と同じ意味なので、値としては作れないようにしています。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostedLink(String);

impl HostedLink {
    /// 空白のみ・空文字列なら None
    pub fn parse(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// VideoRecord は `videos` の 1 行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: VideoId,
    pub file_path: PathBuf,
    pub title: String,
    pub description: String,
    /// None = pending（まだアップロードされていない）
    pub hosted_link: Option<HostedLink>,
}

impl VideoRecord {
    /// 未処理のレコードを作成（テストや InMemory ストアの投入用）
    pub fn pending(
        id: VideoId,
        file_path: impl Into<PathBuf>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            file_path: file_path.into(),
            title: title.into(),
            description: description.into(),
            hosted_link: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.hosted_link.is_none()
    }

    /// Uploader に渡す要求を組み立てる
    pub fn upload_request(&self) -> VideoUpload {
        VideoUpload {
            file_path: self.file_path.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

/// VideoUpload は Uploader への入力
///
/// レコードの id は含めません（ホスティング側は行キーを知らなくてよい）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUpload {
    pub file_path: PathBuf,
    pub title: String,
    pub description: String,
}

impl VideoUpload {
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}
