/// Lambdaエントリポイント共通処理
///
/// Lambdaランタイムから受け取ったイベントJSONを`ApiEvent`に変換し、
/// 呼び出しごとに新しいトレーサーを用意して`RequestHandler`に渡す。
use serde_json::Value;

use crate::application::{BusinessOperation, RequestHandler};
use crate::domain::{ApiResponse, InvocationContext};
use crate::infrastructure::{debug_enabled_from_env, DebugTracer, NoopTracer, Tracer};

#[derive(Debug, Clone, Copy)]
pub struct LambdaEntry {
    handler: RequestHandler,
    /// デバッグトレーサーを使うかどうか
    debug_enabled: bool,
}

impl LambdaEntry {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            handler: RequestHandler::new(),
            debug_enabled,
        }
    }

    /// NOTES_DEBUGから設定を読み込んで作成
    pub fn from_env() -> Self {
        Self::new(debug_enabled_from_env())
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    /// Lambdaイベントを処理してプロキシレスポンスを返す
    pub async fn dispatch<O>(
        &self,
        operation: &O,
        payload: Value,
        lambda_context: &lambda_runtime::Context,
    ) -> ApiResponse
    where
        O: BusinessOperation + ?Sized,
    {
        self.dispatch_with_context(operation, payload, InvocationContext::from_lambda(lambda_context))
            .await
    }

    /// 呼び出しコンテキストを指定して処理
    pub async fn dispatch_with_context<O>(
        &self,
        operation: &O,
        payload: Value,
        context: InvocationContext,
    ) -> ApiResponse
    where
        O: BusinessOperation + ?Sized,
    {
        let (mut tracer, context) = self.tracer_for(context);
        self.dispatch_with_tracer(tracer.as_mut(), operation, payload, &context)
            .await
    }

    /// トレーサーを指定して処理
    ///
    /// イベントの変換もトレーサーのライフサイクル内で行う。
    pub async fn dispatch_with_tracer<T, O>(
        &self,
        tracer: &mut T,
        operation: &O,
        payload: Value,
        context: &InvocationContext,
    ) -> ApiResponse
    where
        T: Tracer + ?Sized,
        O: BusinessOperation + ?Sized,
    {
        self.handler
            .handle_payload(tracer, operation, &payload, context)
            .await
    }

    /// この呼び出し専用のトレーサーを用意する
    ///
    /// デバッグ有効時はトレーサーのバッファをコンテキストに結び付ける。
    fn tracer_for(&self, context: InvocationContext) -> (Box<dyn Tracer>, InvocationContext) {
        if self.debug_enabled {
            let tracer = DebugTracer::new();
            let context = context.with_recorder(tracer.recorder());
            (Box::new(tracer), context)
        } else {
            (Box::new(NoopTracer), context)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::CreateNoteOperation;
    use crate::domain::HandlerError;
    use crate::infrastructure::note_repository::tests::MockNoteRepository;
    use crate::infrastructure::tracer::tests::MockTracer;
    use serde_json::json;

    fn context() -> InvocationContext {
        InvocationContext::new("req-1", "arn:aws:lambda:us-east-1:123456789012:function:create", 0)
    }

    fn proxy_event(body: &str) -> Value {
        json!({
            "httpMethod": "POST",
            "body": body,
            "requestContext": {
                "identity": {"cognitoIdentityId": "us-east-1:user-1"}
            }
        })
    }

    #[tokio::test]
    async fn test_dispatch_success_with_debug_tracer() {
        let repository = MockNoteRepository::new();
        let operation = CreateNoteOperation::new(repository.clone());

        let response = LambdaEntry::new(true)
            .dispatch_with_context(&operation, proxy_event(r#"{"content":"hi"}"#), context())
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(repository.note_count(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_failure_with_noop_tracer() {
        let operation = CreateNoteOperation::new(MockNoteRepository::new());

        let response = LambdaEntry::new(false)
            .dispatch_with_context(&operation, proxy_event("not json"), context())
            .await;

        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("Invalid request body"));
    }

    #[tokio::test]
    async fn test_dispatch_invalid_event() {
        let repository = MockNoteRepository::new();
        let operation = CreateNoteOperation::new(repository.clone());

        let response = LambdaEntry::new(true)
            .dispatch_with_context(&operation, json!([1, 2, 3]), context())
            .await;

        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("Invalid request event"));
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(repository.note_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_event_goes_through_tracer() {
        let repository = MockNoteRepository::new();
        let operation = CreateNoteOperation::new(repository.clone());
        let mut tracer = MockTracer::new();

        let response = LambdaEntry::new(true)
            .dispatch_with_tracer(&mut tracer, &operation, json!([1, 2, 3]), &context())
            .await;

        assert_eq!(response.status_code, 500);
        assert_eq!(tracer.calls, vec!["init", "flush", "end"]);
        assert!(matches!(tracer.flushed[0], HandlerError::InvalidEvent(_)));
        assert_eq!(repository.note_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_event_with_injected_tracer() {
        let repository = MockNoteRepository::new();
        let operation = CreateNoteOperation::new(repository.clone());
        let mut tracer = MockTracer::new();

        let response = LambdaEntry::new(false)
            .dispatch_with_tracer(&mut tracer, &operation, proxy_event(r#"{"content":"hi"}"#), &context())
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(tracer.calls, vec!["init", "end"]);
        assert_eq!(repository.note_count(), 1);
    }

    #[test]
    fn test_new_keeps_debug_flag() {
        assert!(LambdaEntry::new(true).debug_enabled());
        assert!(!LambdaEntry::new(false).debug_enabled());
    }
}
