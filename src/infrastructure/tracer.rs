//! リクエスト診断トレーサー
//!
//! 1回のリクエストに閉じたデバッグログを収集し、失敗時にだけまとめて出力する。
//! 成功したリクエストのデバッグログは出力せずに破棄する。
//!
//! ライフサイクル:
//! - `init`: リクエスト開始。前回の状態を破棄し、イベント概要を記録する
//! - `flush`: 失敗時のみ。収集済みログとエラーを出力する
//! - `end`: 必ず最後に1回。リクエスト単位の状態を解放する

use std::time::Instant;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::domain::{ApiEvent, HandlerError, InvocationContext, TraceRecorder};

/// トレーサー操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TracerError {
    /// 初期化に失敗
    #[error("Tracer init failed: {0}")]
    InitFailed(String),

    /// 診断情報の出力に失敗
    #[error("Tracer flush failed: {0}")]
    FlushFailed(String),
}

impl From<TracerError> for HandlerError {
    fn from(err: TracerError) -> Self {
        HandlerError::Tracer(err.to_string())
    }
}

/// リクエスト診断トレーサーのトレイト
///
/// 呼び出しごとに新しいインスタンスを用意する前提で、`&mut self`で状態を持つ。
#[async_trait]
pub trait Tracer: Send {
    /// リクエスト開始時に呼ばれる
    async fn init(&mut self, event: &ApiEvent, context: &InvocationContext) -> Result<(), TracerError>;

    /// 失敗時にのみ呼ばれる
    async fn flush(&mut self, error: &HandlerError) -> Result<(), TracerError>;

    /// 成否に関わらず最後に1回だけ呼ばれる
    async fn end(&mut self);
}

/// 失敗時にデバッグログをまとめて出力するトレーサー
#[derive(Debug)]
pub struct DebugTracer {
    /// デバッグメッセージのバッファ（オペレーションと共有）
    recorder: TraceRecorder,
    /// `init`された時刻
    started_at: Option<Instant>,
    /// 現在処理中のリクエストID
    request_id: Option<String>,
}

impl DebugTracer {
    pub fn new() -> Self {
        Self {
            recorder: TraceRecorder::new(),
            started_at: None,
            request_id: None,
        }
    }

    /// オペレーションへ渡すレコーダー
    ///
    /// `InvocationContext::with_recorder`に渡すと、オペレーション側の
    /// `context.debug(..)`がこのトレーサーのバッファに入る。
    pub fn recorder(&self) -> TraceRecorder {
        self.recorder.clone()
    }

    /// 初期化済みかどうか
    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// デバッグメッセージを記録
    pub fn debug(&self, message: impl Into<String>) {
        self.recorder.debug(message);
    }

    fn elapsed_ms(&self) -> u64 {
        self.started_at
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }
}

impl Default for DebugTracer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tracer for DebugTracer {
    async fn init(&mut self, event: &ApiEvent, context: &InvocationContext) -> Result<(), TracerError> {
        self.recorder.clear();
        self.started_at = Some(Instant::now());
        self.request_id = Some(context.request_id().to_string());

        let summary = json!({
            "requestId": event.gateway_request_id(),
            "sourceIp": event.source_ip(),
            "body": event.body,
            "pathParameters": event.path_parameters,
            "queryStringParameters": event.query_string_parameters,
        });
        self.recorder.debug(format!("API event: {}", summary));
        self.recorder.debug(format!(
            "Lambda context: function={} deadline_ms={}",
            context.function_arn(),
            context.deadline_ms()
        ));

        Ok(())
    }

    async fn flush(&mut self, err: &HandlerError) -> Result<(), TracerError> {
        let request_id = self.request_id.as_deref().unwrap_or("unknown");

        for entry in self.recorder.take() {
            info!(
                request_id = request_id,
                logged_at = entry.timestamp_ms,
                "{}",
                entry.message
            );
        }

        error!(
            request_id = request_id,
            elapsed_ms = self.elapsed_ms(),
            error = %err,
            "デバッグログ出力完了"
        );

        Ok(())
    }

    async fn end(&mut self) {
        self.recorder.clear();
        self.started_at = None;
        self.request_id = None;
    }
}

/// 何も記録・出力しないトレーサー
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

#[async_trait]
impl Tracer for NoopTracer {
    async fn init(&mut self, _event: &ApiEvent, _context: &InvocationContext) -> Result<(), TracerError> {
        Ok(())
    }

    async fn flush(&mut self, _error: &HandlerError) -> Result<(), TracerError> {
        Ok(())
    }

    async fn end(&mut self) {}
}
