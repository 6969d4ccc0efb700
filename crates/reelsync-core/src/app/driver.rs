//! BatchUploadDriver - pending を固定サイズのバッチで取り出してアップロードするループ
//!
//! # フロー
//! 1. VideoStore::fetch_pending() でバッチを取得（空なら Done）
//! 2. 1 件ずつ Uploader::upload()
//! 3. 成功したらその場で VideoStore::record_link()（バッチ単位にまとめない）
//! 4. 失敗したらログに残して次のレコードへ（この実行の中では再試行しない）
//! 5. バッチの最後の id をカーソルにして 1 へ
//!
//! リンクを 1 件ごとに書き戻すので、途中でプロセスが殺されても
//! 次の実行はまだリンクの無い行から再開する。

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, debug, error, info};

use super::config::Config;
use super::progress::{Progress, Throughput};
use super::status::RunReport;
use crate::domain::{DriverState, PersistenceError, RecordOutcome, VideoRecord};
use crate::ports::{Clock, IdGenerator, SystemClock, UlidGenerator, Uploader, VideoStore};

pub struct BatchUploadDriver<S, U> {
    store: S,
    uploader: U,
    batch_size: usize,
    clock: Arc<dyn Clock>,
    state: DriverState,
}

impl<S: VideoStore, U: Uploader> BatchUploadDriver<S, U> {
    pub fn new(store: S, uploader: U, config: &Config) -> Self {
        Self {
            store,
            uploader,
            batch_size: config.batch_size,
            clock: Arc::new(SystemClock),
            state: DriverState::Running,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// store が尽きるまで回す
    ///
    /// UploadError はレコード単位で回収する。PersistenceError はそのまま返す
    /// （その場合 state は Running のまま）。
    pub async fn run(&mut self) -> Result<RunReport, PersistenceError> {
        let run_id = UlidGenerator::new(Arc::clone(&self.clock)).generate_run_id();
        let mut report = RunReport::new(run_id, self.clock.now());
        self.state = DriverState::Running;

        let span = tracing::info_span!("run", %run_id);
        self.drive(&mut report).instrument(span).await?;

        // fetch_pending が空を返した
        self.state = DriverState::Done;
        report.finish(self.clock.now());
        info!(
            %run_id,
            batches = report.batches,
            uploaded = report.uploaded,
            failed = report.failed,
            "run complete"
        );
        Ok(report)
    }

    async fn drive(&self, report: &mut RunReport) -> Result<(), PersistenceError> {
        let pending = self.store.count_pending().await?;
        info!(pending, batch_size = self.batch_size, "starting upload run");

        let mut progress = Progress::new(pending);
        let mut cursor = None;
        loop {
            let batch = self.store.fetch_pending(cursor, self.batch_size).await?;
            let Some(last) = batch.last() else {
                break;
            };
            cursor = Some(last.id);
            report.batches += 1;
            debug!(batch = report.batches, size = batch.len(), "fetched batch");

            for record in &batch {
                self.process(record, report, &mut progress).await?;
            }
        }
        Ok(())
    }

    async fn process(
        &self,
        record: &VideoRecord,
        report: &mut RunReport,
        progress: &mut Progress,
    ) -> Result<(), PersistenceError> {
        let started = Instant::now();
        let result = self.uploader.upload(&record.upload_request()).await;
        progress.advance();

        match result {
            Ok(link) => {
                if let Err(err) = self.store.record_link(record.id, &link).await {
                    // アップロード済みなので、次の実行で同じファイルが再アップロードされる
                    error!(
                        video_id = %record.id,
                        file_path = %record.file_path.display(),
                        link = %link,
                        error = %err,
                        "uploaded but failed to record link; patch the row by hand to avoid a duplicate upload"
                    );
                    return Err(err);
                }

                let bytes = tokio::fs::metadata(&record.file_path)
                    .await
                    .ok()
                    .map(|m| m.len());
                let throughput = Throughput::measure(bytes, started.elapsed());
                info!(
                    video_id = %record.id,
                    link = %link,
                    progress = %progress,
                    speed = %throughput,
                    "uploaded"
                );
                report.record(RecordOutcome::uploaded(record, link));
            }
            Err(err) => {
                error!(
                    video_id = %record.id,
                    file_path = %record.file_path.display(),
                    progress = %progress,
                    error = %err,
                    "upload failed; record left pending"
                );
                report.record(RecordOutcome::failed(record, err.to_string()));
            }
        }
        Ok(())
    }
}
