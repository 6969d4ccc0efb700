//! State - ドライバーの状態

/// DriverState は BatchUploadDriver の状態
///
/// # 状態遷移
/// - running: pending を取得してアップロード中
/// - done: 取得結果が空になった（終端）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Done,
}

impl DriverState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DriverState::Done)
    }
}
