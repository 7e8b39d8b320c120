// ハンドラー結果
//
// 1回の呼び出しにつき1つだけ生成され、HTTPレスポンスへ変換された後に破棄される。

use serde_json::Value;

use super::HandlerError;

/// エラーメッセージが空の場合に使用する汎用メッセージ
pub const FALLBACK_ERROR_MESSAGE: &str = "Internal server error";

/// ビジネスオペレーションの成否を表すタグ付き結果
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// 成功（JSONに変換済みの結果）
    Success(Value),
    /// 失敗（エラーメッセージ）
    Failure(String),
}

impl HandlerOutcome {
    /// 成功結果を作成
    pub fn success(value: Value) -> Self {
        HandlerOutcome::Success(value)
    }

    /// 失敗結果を作成
    ///
    /// メッセージが空白のみの場合は`FALLBACK_ERROR_MESSAGE`に置き換える。
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            HandlerOutcome::Failure(FALLBACK_ERROR_MESSAGE.to_string())
        } else {
            HandlerOutcome::Failure(message)
        }
    }

    /// エラーから失敗結果を作成
    pub fn from_error(error: &HandlerError) -> Self {
        Self::failure(error.to_string())
    }

    /// 成功かどうか
    pub fn is_success(&self) -> bool {
        matches!(self, HandlerOutcome::Success(_))
    }
}
