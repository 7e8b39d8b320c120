/// 課金 HTTP Lambdaエントリポイント
///
/// API Gateway（RESTプロキシ統合）経由で`POST /billing`を受け取り、
/// 保存したいノート数に応じた金額をStripeで課金する。
use lambda_runtime::{service_fn, Error, LambdaEvent};
use notes_api::application::{BillingOperation, LambdaEntry};
use notes_api::domain::{ApiResponse, HandlerError};
use notes_api::infrastructure::{init_logging, StripeConfig, StripePaymentGateway};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// StripePaymentGatewayの静的インスタンス
///
/// シークレットキーのSSM取得とHTTPクライアント構築をコールドスタート時の1回に抑える。
static PAYMENT_GATEWAY: OnceCell<StripePaymentGateway> = OnceCell::const_new();

async fn get_payment_gateway() -> Result<&'static StripePaymentGateway, HandlerError> {
    PAYMENT_GATEWAY
        .get_or_try_init(|| async {
            let config = StripeConfig::from_env_with_ssm().await?;
            Ok(StripePaymentGateway::new(config.secret_key())?)
        })
        .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!(function = "billing", "Lambda関数を初期化");

    lambda_runtime::run(service_fn(handler)).await
}

/// Lambda関数のメインハンドラー
async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();

    let gateway = match get_payment_gateway().await {
        Ok(gateway) => gateway,
        Err(err) => {
            error!(request_id = %context.request_id, error = %err, "決済ゲートウェイ初期化失敗");
            return Ok(ApiResponse::from_error(&err).into_value());
        }
    };

    let operation = BillingOperation::new(gateway.clone());
    let response = LambdaEntry::from_env()
        .dispatch(&operation, payload, &context)
        .await;

    Ok(response.into_value())
}
