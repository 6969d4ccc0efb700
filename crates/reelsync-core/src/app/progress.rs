//! Progress - 進捗と転送速度の表示用
//!
//! 表示専用。ドライバーの判断には使わない。

use std::fmt;
use std::time::Duration;

const MIB: f64 = 1024.0 * 1024.0;

/// `done/total` の形で表示するカウンタ
#[derive(Debug, Clone, Copy, Default)]
pub struct Progress {
    done: u64,
    total: u64,
}

impl Progress {
    pub fn new(total: u64) -> Self {
        Self { done: 0, total }
    }

    pub fn advance(&mut self) {
        self.done += 1;
        // 実行中に外部から行が追加された場合は分母を追従させる
        self.total = self.total.max(self.done);
    }

    pub fn done(&self) -> u64 {
        self.done
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.done, self.total)
    }
}

/// 1 ファイル分の転送速度（MB/s）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput(Option<f64>);

impl Throughput {
    /// サイズ不明、または経過時間 0 なら計測不能
    pub fn measure(bytes: Option<u64>, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        match bytes {
            Some(bytes) if secs > 0.0 => Self(Some(bytes as f64 / MIB / secs)),
            _ => Self(None),
        }
    }

    pub fn mb_per_sec(&self) -> Option<f64> {
        self.0
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(speed) => write!(f, "{speed:.2} MB/s"),
            None => f.write_str("n/a"),
        }
    }
}
