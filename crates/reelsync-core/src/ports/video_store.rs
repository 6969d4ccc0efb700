//! VideoStore port - `videos` テーブルへの唯一の入口
//!
//! # 実装
//! - `SqliteVideoStore`（本番用、rusqlite）
//! - `InMemoryVideoStore`（テスト用）

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{HostedLink, PersistenceError, VideoId, VideoRecord};

/// VideoStore は pending の読み出しとリンクの書き戻しを担当
///
/// # 設計原則
/// - 呼び出し間で状態を持たない（毎回 DB を問い合わせる）
/// - pending = `hosted_link` が NULL または空文字列
/// - 外部から DB が書き換えられても次の呼び出しで反映される
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// pending のレコードを id 昇順で最大 `batch_size` 件返す
    ///
    /// `after` が Some なら、その id より大きいものだけを返す。
    /// 空の Vec は「もう残っていない」の合図。
    async fn fetch_pending(
        &self,
        after: Option<VideoId>,
        batch_size: usize,
    ) -> Result<Vec<VideoRecord>, PersistenceError>;

    /// `id` の行に `link` を書き込む
    ///
    /// 行が存在しなければ `PersistenceError::NotFound`。
    async fn record_link(&self, id: VideoId, link: &HostedLink) -> Result<(), PersistenceError>;

    /// pending の件数（進捗表示の分母）
    async fn count_pending(&self) -> Result<u64, PersistenceError>;
}

#[async_trait]
impl<S: VideoStore + ?Sized> VideoStore for Arc<S> {
    async fn fetch_pending(
        &self,
        after: Option<VideoId>,
        batch_size: usize,
    ) -> Result<Vec<VideoRecord>, PersistenceError> {
        (**self).fetch_pending(after, batch_size).await
    }

    async fn record_link(&self, id: VideoId, link: &HostedLink) -> Result<(), PersistenceError> {
        (**self).record_link(id, link).await
    }

    async fn count_pending(&self) -> Result<u64, PersistenceError> {
        (**self).count_pending().await
    }
}
