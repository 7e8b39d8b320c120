/// ビジネスオペレーション
///
/// `RequestHandler`に包まれる1つのAPI処理。リクエストボディのパースから
/// 外部サービス呼び出しまでを行い、JSONにシリアライズ可能な結果を返す。
use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{ApiEvent, HandlerError, InvocationContext};

#[async_trait]
pub trait BusinessOperation: Send + Sync {
    /// 成功時の結果型
    type Output: Serialize + Send;

    /// オペレーションを実行
    async fn execute(
        &self,
        event: &ApiEvent,
        context: &InvocationContext,
    ) -> Result<Self::Output, HandlerError>;
}
