//! Uploader port - 動画ホスティングへのアップロード
//!
//! # 実装
//! - `VimeoUploader`（本番用）
//! - テストでは各モジュールの tests 内で fake を定義する

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{HostedLink, UploadError, VideoUpload};

/// Uploader はファイル 1 件をアップロードして公開 URL を返す
///
/// 認証情報は構築時に渡す（呼び出しごとには渡さない）。
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, video: &VideoUpload) -> Result<HostedLink, UploadError>;
}

#[async_trait]
impl<U: Uploader + ?Sized> Uploader for Arc<U> {
    async fn upload(&self, video: &VideoUpload) -> Result<HostedLink, UploadError> {
        (**self).upload(video).await
    }
}
