//! リクエストハンドラーラッパー
//!
//! 任意のビジネスオペレーションをトレーサーのライフサイクルで挟み、
//! 結果を常にHTTPレスポンスへ変換する。
//!
//! # 処理フロー
//! 1. `Tracer::init`
//! 2. オペレーション実行と結果のJSON変換
//! 3. 失敗時のみ`Tracer::flush`
//! 4. 成否に関わらず`Tracer::end`を1回
//! 5. 200または500のレスポンスを返却
//!
//! どの段階の失敗・パニックも呼び出し元へは伝播させない。

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::application::BusinessOperation;
use crate::domain::{ApiEvent, ApiResponse, HandlerError, HandlerOutcome, InvocationContext};
use crate::infrastructure::Tracer;

/// パニックのペイロードからメッセージを取り出す
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Futureを実行し、パニックをメッセージに変換する
async fn contain<F: Future>(future: F) -> Result<F::Output, String> {
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|payload| panic_message(payload.as_ref()))
}

/// ビジネスオペレーションをHTTPレスポンスへ適合させるラッパー
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestHandler;

impl RequestHandler {
    pub fn new() -> Self {
        Self
    }

    /// 1回の呼び出しを処理
    ///
    /// # 引数
    /// * `tracer` - この呼び出し専用のトレーサー
    /// * `operation` - 実行するビジネスオペレーション
    /// * `event` - リクエストイベント
    /// * `context` - 呼び出しコンテキスト
    ///
    /// # 戻り値
    /// 常にHTTPレスポンス（失敗時は500）
    pub async fn handle<T, O>(
        &self,
        tracer: &mut T,
        operation: &O,
        event: &ApiEvent,
        context: &InvocationContext,
    ) -> ApiResponse
    where
        T: Tracer + ?Sized,
        O: BusinessOperation + ?Sized,
    {
        self.process(tracer, operation, event, None, context).await
    }

    /// 生のイベントJSONを変換してから1回の呼び出しを処理
    ///
    /// 変換に失敗した場合もトレーサーのライフサイクルを通し、
    /// 元のイベントをデバッグログに残したうえで500を返す。
    pub async fn handle_payload<T, O>(
        &self,
        tracer: &mut T,
        operation: &O,
        payload: &Value,
        context: &InvocationContext,
    ) -> ApiResponse
    where
        T: Tracer + ?Sized,
        O: BusinessOperation + ?Sized,
    {
        match ApiEvent::from_value(payload) {
            Ok(event) => self.handle(tracer, operation, &event, context).await,
            Err(err) => {
                self.process(tracer, operation, &ApiEvent::default(), Some((payload, err)), context)
                    .await
            }
        }
    }

    async fn process<T, O>(
        &self,
        tracer: &mut T,
        operation: &O,
        event: &ApiEvent,
        rejected: Option<(&Value, HandlerError)>,
        context: &InvocationContext,
    ) -> ApiResponse
    where
        T: Tracer + ?Sized,
        O: BusinessOperation + ?Sized,
    {
        let outcome = Self::run(tracer, operation, event, rejected, context).await;

        if let Err(message) = contain(tracer.end()).await {
            warn!(request_id = context.request_id(), panic = %message, "トレーサー終了処理でパニック");
        }

        match &outcome {
            HandlerOutcome::Success(_) => {
                info!(request_id = context.request_id(), status = 200, "リクエスト処理完了")
            }
            HandlerOutcome::Failure(message) => {
                error!(request_id = context.request_id(), status = 500, error = %message, "リクエスト処理失敗")
            }
        }

        ApiResponse::from_outcome(outcome)
    }

    /// 初期化からflushまでを実行して結果を確定させる
    async fn run<T, O>(
        tracer: &mut T,
        operation: &O,
        event: &ApiEvent,
        rejected: Option<(&Value, HandlerError)>,
        context: &InvocationContext,
    ) -> HandlerOutcome
    where
        T: Tracer + ?Sized,
        O: BusinessOperation + ?Sized,
    {
        let result = match contain(tracer.init(event, context)).await {
            Ok(Ok(())) => match rejected {
                // 変換できなかったイベントはオペレーションに渡さない
                Some((payload, err)) => {
                    context.debug(format!("Rejected event: {}", payload));
                    Err(err)
                }
                None => Self::invoke(operation, event, context).await,
            },
            Ok(Err(err)) => Err(HandlerError::from(err)),
            Err(message) => Err(HandlerError::Tracer(format!("init panicked: {}", message))),
        };

        match result {
            Ok(value) => HandlerOutcome::success(value),
            Err(err) => {
                // flushの失敗は元のエラーを上書きしない
                match contain(tracer.flush(&err)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(flush_err)) => {
                        warn!(request_id = context.request_id(), error = %flush_err, "トレーサーflush失敗")
                    }
                    Err(message) => {
                        warn!(request_id = context.request_id(), panic = %message, "トレーサーflushでパニック")
                    }
                }
                HandlerOutcome::from_error(&err)
            }
        }
    }

    /// オペレーションを実行し、結果をJSON値に変換する
    async fn invoke<O>(
        operation: &O,
        event: &ApiEvent,
        context: &InvocationContext,
    ) -> Result<Value, HandlerError>
    where
        O: BusinessOperation + ?Sized,
    {
        // JSON変換中のパニックも実行中のパニックとして扱う
        contain(async {
            let output = operation.execute(event, context).await?;
            serde_json::to_value(output).map_err(|e| HandlerError::Serialization(e.to_string()))
        })
        .await
        .map_err(HandlerError::Panic)?
    }
}
