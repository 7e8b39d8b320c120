/// ノート作成 HTTP Lambdaエントリポイント
///
/// API Gateway（RESTプロキシ統合）経由で`POST /notes`を受け取り、
/// 呼び出し元ユーザーのノートをDynamoDBに保存する。
use lambda_runtime::{service_fn, Error, LambdaEvent};
use notes_api::application::{CreateNoteOperation, LambdaEntry};
use notes_api::domain::{ApiResponse, HandlerError};
use notes_api::infrastructure::{init_logging, ConfigError, DynamoNoteRepository, NotesTableConfig};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// DynamoNoteRepositoryの静的インスタンス
///
/// Lambda warm start時にDynamoDBクライアントを再利用する。
static NOTE_REPOSITORY: OnceCell<DynamoNoteRepository> = OnceCell::const_new();

async fn get_note_repository() -> Result<&'static DynamoNoteRepository, ConfigError> {
    NOTE_REPOSITORY
        .get_or_try_init(|| async {
            let config = NotesTableConfig::from_env().await?;
            Ok(DynamoNoteRepository::new(
                config.client().clone(),
                config.table_name().to_string(),
            ))
        })
        .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!(function = "create", "Lambda関数を初期化");

    lambda_runtime::run(service_fn(handler)).await
}

/// Lambda関数のメインハンドラー
///
/// 設定読み込みに失敗した場合も500レスポンスを返し、ランタイムエラーにはしない。
async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();

    let repository = match get_note_repository().await {
        Ok(repository) => repository,
        Err(err) => {
            error!(request_id = %context.request_id, error = %err, "ノートテーブル設定読み込み失敗");
            return Ok(ApiResponse::from_error(&HandlerError::from(err)).into_value());
        }
    };

    let operation = CreateNoteOperation::new(repository.clone());
    let response = LambdaEntry::from_env()
        .dispatch(&operation, payload, &context)
        .await;

    Ok(response.into_value())
}
