//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部システム（SQLite, Vimeo API, 時刻）へのインターフェースを提供し、
//! ドライバーから実装の詳細を隠蔽します。

pub mod clock;
pub mod id_generator;
pub mod uploader;
pub mod video_store;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::uploader::Uploader;
pub use self::video_store::VideoStore;
