//! InMemoryVideoStore - 開発用・テスト用の VideoStore
//!
//! SqliteVideoStore と同じ契約を BTreeMap の上で実装します。
//! BTreeMap なので id 昇順の走査がそのまま fetch_pending の順序になります。

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{HostedLink, PersistenceError, VideoId, VideoRecord};
use crate::ports::VideoStore;

#[derive(Default)]
pub struct InMemoryVideoStore {
    videos: Mutex<BTreeMap<VideoId, VideoRecord>>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_videos(videos: impl IntoIterator<Item = VideoRecord>) -> Self {
        let videos = videos.into_iter().map(|v| (v.id, v)).collect();
        Self {
            videos: Mutex::new(videos),
        }
    }

    /// 同じ id があれば上書き
    pub async fn insert(&self, video: VideoRecord) {
        self.videos.lock().await.insert(video.id, video);
    }

    pub async fn get(&self, id: VideoId) -> Option<VideoRecord> {
        self.videos.lock().await.get(&id).cloned()
    }

    /// 全件のコピー（id 昇順）
    pub async fn snapshot(&self) -> Vec<VideoRecord> {
        self.videos.lock().await.values().cloned().collect()
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn fetch_pending(
        &self,
        after: Option<VideoId>,
        batch_size: usize,
    ) -> Result<Vec<VideoRecord>, PersistenceError> {
        let videos = self.videos.lock().await;
        let lower = match after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        Ok(videos
            .range((lower, Bound::Unbounded))
            .map(|(_, v)| v)
            .filter(|v| v.is_pending())
            .take(batch_size)
            .cloned()
            .collect())
    }

    async fn record_link(&self, id: VideoId, link: &HostedLink) -> Result<(), PersistenceError> {
        let mut videos = self.videos.lock().await;
        let video = videos.get_mut(&id).ok_or(PersistenceError::NotFound(id))?;
        video.hosted_link = Some(link.clone());
        Ok(())
    }

    async fn count_pending(&self) -> Result<u64, PersistenceError> {
        let videos = self.videos.lock().await;
        Ok(videos.values().filter(|v| v.is_pending()).count() as u64)
    }
}
