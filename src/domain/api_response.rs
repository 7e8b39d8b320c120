// HTTPレスポンス
//
// API Gateway Lambdaプロキシ統合が期待する`{statusCode, headers, body}`形式。
// ハンドラー結果から決定的に導出される。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{HandlerError, HandlerOutcome};

/// 成功時のステータスコード
pub const STATUS_OK: u16 = 200;

/// 失敗時のステータスコード
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Lambdaプロキシ統合のHTTPレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// HTTPステータスコード
    pub status_code: u16,
    /// レスポンスヘッダー（常にCORSヘッダーを含む）
    pub headers: BTreeMap<String, String>,
    /// JSONエンコード済みのボディ
    pub body: String,
}

impl ApiResponse {
    /// ハンドラー結果からレスポンスを生成
    ///
    /// - 成功: 200、ボディは結果のJSON
    /// - 失敗: 500、ボディは`{"error": message}`
    pub fn from_outcome(outcome: HandlerOutcome) -> Self {
        match outcome {
            HandlerOutcome::Success(value) => Self::new(STATUS_OK, value.to_string()),
            HandlerOutcome::Failure(message) => {
                Self::new(STATUS_INTERNAL_ERROR, json!({ "error": message }).to_string())
            }
        }
    }

    /// エラーから直接500レスポンスを生成
    ///
    /// ラッパーを経由できない段階（設定読み込み失敗など）で使用する。
    pub fn from_error(error: &HandlerError) -> Self {
        Self::from_outcome(HandlerOutcome::from_error(error))
    }

    fn new(status_code: u16, body: String) -> Self {
        Self {
            status_code,
            headers: Self::build_cors_headers(),
            body,
        }
    }

    /// CORSヘッダーを生成
    ///
    /// - Access-Control-Allow-Origin: *
    /// - Access-Control-Allow-Credentials: true
    pub fn build_cors_headers() -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        headers.insert(
            "Access-Control-Allow-Credentials".to_string(),
            "true".to_string(),
        );
        headers
    }

    /// Lambdaランタイムへ返却するJSON値に変換
    pub fn into_value(self) -> Value {
        json!({
            "statusCode": self.status_code,
            "headers": self.headers,
            "body": self.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response =
            ApiResponse::from_outcome(HandlerOutcome::success(json!({"id": "abc", "value": 5})));

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"id":"abc","value":5}"#);
    }

    #[test]
    fn test_failure_response() {
        let response = ApiResponse::from_outcome(HandlerOutcome::failure("not found"));

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, r#"{"error":"not found"}"#);
    }

    #[test]
    fn test_null_value_serializes_to_null_body() {
        let response = ApiResponse::from_outcome(HandlerOutcome::success(Value::Null));
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "null");
    }

    #[test]
    fn test_cors_headers_on_both_paths() {
        for outcome in [
            HandlerOutcome::success(json!(true)),
            HandlerOutcome::failure("boom"),
        ] {
            let response = ApiResponse::from_outcome(outcome);
            assert_eq!(response.headers.len(), 2);
            assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
            assert_eq!(response.headers["Access-Control-Allow-Credentials"], "true");
        }
    }

    #[test]
    fn test_from_error() {
        let response = ApiResponse::from_error(&HandlerError::Configuration(
            "Missing environment variable: TABLE_NAME".to_string(),
        ));
        assert_eq!(response.status_code, 500);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(
            body["error"],
            "Configuration error: Missing environment variable: TABLE_NAME"
        );
    }

    /// Lambdaプロキシ統合のキー名（camelCase）で出力される
    #[test]
    fn test_into_value_uses_proxy_keys() {
        let value = ApiResponse::from_outcome(HandlerOutcome::success(json!({"ok": 1}))).into_value();

        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["headers"]["Access-Control-Allow-Origin"], "*");
        assert_eq!(value["body"], r#"{"ok":1}"#);
    }

    #[test]
    fn test_serde_matches_into_value() {
        let response = ApiResponse::from_outcome(HandlerOutcome::failure("x"));
        let serialized = serde_json::to_value(&response).unwrap();
        assert_eq!(serialized, response.clone().into_value());

        let restored: ApiResponse = serde_json::from_value(serialized).unwrap();
        assert_eq!(restored, response);
    }
}
