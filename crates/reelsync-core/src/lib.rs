//! reelsync-core
//!
//! SQLite に登録された動画ファイルを Vimeo にアップロードし、
//! 返ってきたリンクを同じ DB に書き戻すための部品。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（VideoId, VideoRecord, HostedLink, DriverState, errors）
//! - **ports**: 抽象化レイヤー（VideoStore, Uploader, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（Config, AppBuilder, BatchUploadDriver, RunReport）
//! - **impls**: 実装（SqliteVideoStore, InMemoryVideoStore, VimeoUploader）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
