//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **SqliteVideoStore**: 本番用の VideoStore（既存の SQLite DB）
//! - **InMemoryVideoStore**: 開発・テスト用の VideoStore
//! - **VimeoUploader**: Vimeo API への tus アップロード

pub mod inmem_store;
pub mod sqlite_store;
pub mod vimeo;

// 主要な型を再エクスポート
pub use self::inmem_store::InMemoryVideoStore;
pub use self::sqlite_store::SqliteVideoStore;
pub use self::vimeo::VimeoUploader;
