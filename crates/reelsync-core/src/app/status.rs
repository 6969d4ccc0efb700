//! Status - 1 回の実行の集計
//!
//! 完了時にログへ出す。失敗したレコードは id とパスを残し、手動で調べられるようにする。

use chrono::{DateTime, Utc};
use serde::Serialize;
use ulid::Ulid;

use crate::domain::{OutcomeKind, RecordOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Ulid,
    /// 空でない fetch の回数
    pub batches: usize,
    pub uploaded: usize,
    pub failed: usize,
    pub failures: Vec<RecordOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn new(run_id: Ulid, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            batches: 0,
            uploaded: 0,
            failed: 0,
            failures: Vec::new(),
            started_at,
            finished_at: None,
        }
    }

    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome.kind {
            OutcomeKind::Uploaded => self.uploaded += 1,
            OutcomeKind::Failed => {
                self.failed += 1;
                self.failures.push(outcome);
            }
        }
    }

    pub fn attempted(&self) -> usize {
        self.uploaded + self.failed
    }

    pub fn finish(&mut self, at: DateTime<Utc>) {
        self.finished_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HostedLink, VideoId, VideoRecord};
    use chrono::TimeZone;

    #[test]
    fn keeps_only_failures_but_counts_both() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut report = RunReport::new(Ulid::nil(), at);
        let ok = VideoRecord::pending(VideoId::new(1), "/v/1.mp4", "t", "d");
        let bad = VideoRecord::pending(VideoId::new(2), "/v/2.mp4", "t", "d");

        report.record(RecordOutcome::uploaded(
            &ok,
            HostedLink::parse("https://vimeo.com/1").unwrap(),
        ));
        report.record(RecordOutcome::failed(&bad, "boom"));
        report.finish(at);

        assert_eq!(report.attempted(), 2);
        assert_eq!(report.uploaded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].video_id, VideoId::new(2));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["failures"][0]["reason"], "boom");
        assert!(json["finished_at"].is_string());
    }
}
