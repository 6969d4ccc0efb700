//! Outcome model: result of one record's upload attempt.
//!
//! The driver records one outcome per processed record. Failures are kept in
//! the run report so an operator can inspect or retry them by hand.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ids::VideoId;
use super::video::{HostedLink, VideoRecord};

/// Serialized as SCREAMING_SNAKE_CASE: UPLOADED / FAILED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Uploaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub video_id: VideoId,
    pub file_path: PathBuf,
    pub kind: OutcomeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<HostedLink>,

    /// Human-readable cause, present for failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RecordOutcome {
    pub fn uploaded(record: &VideoRecord, link: HostedLink) -> Self {
        Self {
            video_id: record.id,
            file_path: record.file_path.clone(),
            kind: OutcomeKind::Uploaded,
            link: Some(link),
            reason: None,
        }
    }

    pub fn failed(record: &VideoRecord, reason: impl Into<String>) -> Self {
        Self {
            video_id: record.id,
            file_path: record.file_path.clone(),
            kind: OutcomeKind::Failed,
            link: None,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_outcome_serializes_reason_without_link() {
        let record = VideoRecord::pending(VideoId::new(9), "/v/9.mp4", "t", "d");
        let outcome = RecordOutcome::failed(&record, "video file not found");

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "FAILED");
        assert_eq!(json["video_id"], 9);
        assert_eq!(json["reason"], "video file not found");
        assert!(json.get("link").is_none());
    }
}
