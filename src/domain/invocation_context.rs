/// 呼び出しコンテキスト
///
/// Lambdaコンテキストから取り出した呼び出し単位のメタデータと、
/// 現在のリクエストのトレーサーへ書き込むためのレコーダーを保持する。
use super::TraceRecorder;

#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    /// LambdaリクエストID
    request_id: String,
    /// 呼び出されたLambda関数のARN
    function_arn: String,
    /// 実行期限（Unixミリ秒）
    deadline_ms: u64,
    /// デバッグメッセージ記録先
    recorder: TraceRecorder,
}

impl InvocationContext {
    /// 新しいコンテキストを作成（レコーダーは無効）
    pub fn new(request_id: impl Into<String>, function_arn: impl Into<String>, deadline_ms: u64) -> Self {
        Self {
            request_id: request_id.into(),
            function_arn: function_arn.into(),
            deadline_ms,
            recorder: TraceRecorder::disabled(),
        }
    }

    /// Lambdaランタイムのコンテキストから作成
    pub fn from_lambda(context: &lambda_runtime::Context) -> Self {
        Self::new(
            context.request_id.clone(),
            context.invoked_function_arn.clone(),
            context.deadline,
        )
    }

    /// レコーダーを設定
    pub fn with_recorder(mut self, recorder: TraceRecorder) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn function_arn(&self) -> &str {
        &self.function_arn
    }

    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    pub fn recorder(&self) -> &TraceRecorder {
        &self.recorder
    }

    /// 現在のリクエストのトレーサーへデバッグメッセージを記録
    pub fn debug(&self, message: impl Into<String>) {
        self.recorder.debug(message);
    }
}
