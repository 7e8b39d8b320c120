// 決済ゲートウェイ
//
// Stripe Charges APIへカードトークンと金額を送り、課金する。
// 課金は二重実行を避けるため再試行しない。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::{Charge, HandlerError};

/// Stripe Charges APIのエンドポイント
pub const STRIPE_CHARGES_URL: &str = "https://api.stripe.com/v1/charges";

/// リクエストタイムアウト（秒）
const REQUEST_TIMEOUT_SECS: u64 = 20;

/// 接続タイムアウト（秒）
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// 決済操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PaymentError {
    /// 決済サービスが課金を拒否（カード拒否、不正なトークンなど）
    #[error("Charge declined: {0}")]
    Declined(String),

    /// 想定外のレスポンス
    #[error("Unexpected response: status={status}, message={message}")]
    UnexpectedResponse { status: u16, message: String },

    /// ネットワークエラー
    #[error("Network error: {0}")]
    NetworkError(String),
}

impl From<PaymentError> for HandlerError {
    fn from(err: PaymentError) -> Self {
        HandlerError::Payment(err.to_string())
    }
}

/// 課金成功時の確認情報
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChargeConfirmation {
    /// 決済サービス側の課金ID
    pub id: String,
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub paid: bool,
}

/// 決済ゲートウェイのトレイト
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// 課金を実行
    async fn charge(&self, charge: &Charge) -> Result<ChargeConfirmation, PaymentError>;
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Charges APIに送るフォームパラメータ
pub fn charge_form(charge: &Charge) -> Vec<(&'static str, String)> {
    vec![
        ("source", charge.source.clone()),
        ("amount", charge.amount.to_string()),
        ("description", charge.description.clone()),
        ("currency", charge.currency.clone()),
    ]
}

/// エラーレスポンスを`PaymentError`に変換
///
/// 4xxは課金拒否、5xxやボディが読めない場合は想定外のレスポンスとして扱う。
pub fn error_from_response(status: u16, body: &str) -> PaymentError {
    let detail = serde_json::from_str::<StripeErrorBody>(body).ok().map(|b| b.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone().or_else(|| d.kind.clone()))
        .unwrap_or_else(|| format!("HTTP {}", status));

    if (400..500).contains(&status) && detail.is_some() {
        PaymentError::Declined(message)
    } else {
        PaymentError::UnexpectedResponse { status, message }
    }
}

/// Stripe APIを使ったPaymentGateway実装
#[derive(Clone)]
pub struct StripePaymentGateway {
    client: Client,
    secret_key: String,
    endpoint: String,
}

impl std::fmt::Debug for StripePaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripePaymentGateway")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl StripePaymentGateway {
    /// シークレットキーからゲートウェイを作成
    pub fn new(secret_key: impl Into<String>) -> Result<Self, PaymentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            secret_key: secret_key.into(),
            endpoint: STRIPE_CHARGES_URL.to_string(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    #[instrument(skip(self, charge), fields(amount = charge.amount, currency = %charge.currency))]
    async fn charge(&self, charge: &Charge) -> Result<ChargeConfirmation, PaymentError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.secret_key)
            .form(&charge_form(charge))
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let confirmation = response
                .json::<ChargeConfirmation>()
                .await
                .map_err(|e| PaymentError::UnexpectedResponse {
                    status: status.as_u16(),
                    message: e.to_string(),
                })?;
            info!(charge_id = %confirmation.id, "課金完了");
            return Ok(confirmation);
        }

        let body = response.text().await.unwrap_or_default();
        let err = error_from_response(status.as_u16(), &body);
        warn!(status = status.as_u16(), error = %err, "課金失敗");
        Err(err)
    }
}
