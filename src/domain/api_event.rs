/// API Gatewayリクエストイベント
///
/// Lambdaプロキシ統合で渡されるイベントJSONのうち、本サービスが参照する
/// フィールドだけを型付きで保持する。受信後は不変。
use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::HandlerError;

/// 呼び出し元の認証情報
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Cognito Identity PoolのID（ユーザーIDとして使用）
    #[serde(default)]
    pub cognito_identity_id: Option<String>,
    /// 送信元IP
    #[serde(default)]
    pub source_ip: Option<String>,
}

/// リクエストコンテキスト
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub identity: Option<Identity>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// リクエストイベント
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    /// JSONエンコードされたリクエストボディ
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
    #[serde(default)]
    pub path_parameters: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<BTreeMap<String, String>>,
}

impl ApiEvent {
    /// LambdaイベントのJSONから変換
    pub fn from_value(value: &Value) -> Result<Self, HandlerError> {
        Self::deserialize(value).map_err(|e| HandlerError::InvalidEvent(e.to_string()))
    }

    /// ボディを持つイベントを作成
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    /// 呼び出し元IDを設定
    pub fn with_caller_id(mut self, caller_id: impl Into<String>) -> Self {
        let context = self.request_context.get_or_insert_with(RequestContext::default);
        let identity = context.identity.get_or_insert_with(Identity::default);
        identity.cognito_identity_id = Some(caller_id.into());
        self
    }

    /// 呼び出し元ID（Cognito Identity ID）を取得
    pub fn caller_id(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.identity.as_ref())
            .and_then(|identity| identity.cognito_identity_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// API Gatewayが採番したリクエストID
    pub fn gateway_request_id(&self) -> Option<&str> {
        self.request_context.as_ref().and_then(|ctx| ctx.request_id.as_deref())
    }

    /// 送信元IP
    pub fn source_ip(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.identity.as_ref())
            .and_then(|identity| identity.source_ip.as_deref())
    }

    /// ボディを型付き構造体としてパース
    ///
    /// # 戻り値
    /// * ボディが無い、または空の場合は`HandlerError::MissingBody`
    /// * JSONとして不正、または型に合わない場合は`HandlerError::InvalidBody`
    pub fn parse_body<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        let body = self
            .body
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or(HandlerError::MissingBody)?;

        serde_json::from_str(body).map_err(|e| HandlerError::InvalidBody(e.to_string()))
    }
}
