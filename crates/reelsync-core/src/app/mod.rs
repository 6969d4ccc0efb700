//! App - アプリケーション層
//!
//! ports を組み合わせてアップロードの流れを実装します。
//!
//! # 主要コンポーネント
//! - **Config**: 環境変数から読む実行設定
//! - **AppBuilder**: 本番構成の組み立てと起動時検証
//! - **BatchUploadDriver**: バッチ取得 → アップロード → 書き戻しのループ
//! - **RunReport**: 1 回の実行の集計
//! - **telemetry**: ログ出力の初期化

pub mod builder;
pub mod config;
pub mod driver;
pub mod progress;
pub mod status;
pub mod telemetry;

// 主要な型を再エクスポート
pub use self::builder::{AppBuilder, BuildError, SyncDriver};
pub use self::config::Config;
pub use self::driver::BatchUploadDriver;
pub use self::status::RunReport;
