//! Domain identifiers (strongly-typed IDs).
//!
//! `videos.id` は SQLite の INTEGER PRIMARY KEY なので、ULID ではなく i64 をそのまま包みます。
//! 生の i64 と混同しないように newtype にしています。

use serde::{Deserialize, Serialize};
use std::fmt;

/// VideoId は `videos` テーブルの行キー
///
/// - 外部で採番される（このシステムは INSERT しない）
/// - 昇順がそのまま処理順になる
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(i64);

impl VideoId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// 内部の i64 を取得
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_row_key() {
        let mut ids = vec![VideoId::new(3), VideoId::new(1), VideoId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![VideoId::new(1), VideoId::new(2), VideoId::new(3)]);
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&VideoId::new(42)).unwrap();
        assert_eq!(json, "42");

        let id: VideoId = serde_json::from_str("7").unwrap();
        assert_eq!(id.get(), 7);
    }
}
