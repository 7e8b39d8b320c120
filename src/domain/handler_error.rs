/// ハンドラー処理のエラー型
///
/// ビジネスオペレーション、トレーサー、設定読み込みなど、
/// 1回の呼び出しで発生しうる失敗をすべてこの型に集約する。
/// `Display`の結果がそのままレスポンスボディの`error`フィールドになる。
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HandlerError {
    /// リクエストボディが存在しない
    #[error("Missing request body")]
    MissingBody,

    /// リクエストボディのJSONが不正
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Lambdaイベント自体の形式が不正
    #[error("Invalid request event: {0}")]
    InvalidEvent(String),

    /// requestContextに呼び出し元IDが含まれていない
    #[error("Missing caller identity in request context")]
    MissingIdentity,

    /// ノートリポジトリ操作エラー
    #[error("Repository error: {0}")]
    Repository(String),

    /// 決済処理エラー
    #[error("Payment error: {0}")]
    Payment(String),

    /// トレーサーのライフサイクル操作エラー
    #[error("Tracer error: {0}")]
    Tracer(String),

    /// 結果のJSONシリアライズに失敗
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 環境設定エラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// オペレーション実行中のパニック
    #[error("Operation panicked: {0}")]
    Panic(String),

    /// その他のオペレーション失敗（メッセージをそのまま返す）
    #[error("{0}")]
    Operation(String),
}

impl HandlerError {
    /// 任意のメッセージでオペレーション失敗を作成
    pub fn operation(message: impl Into<String>) -> Self {
        HandlerError::Operation(message.into())
    }
}
