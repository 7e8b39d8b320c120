// 課金ドメイン
//
// 保存したいノート数から請求額を計算し、決済サービスへ送る課金内容を組み立てる。

use serde::{Deserialize, Serialize};

use super::HandlerError;

/// 課金の説明文
pub const CHARGE_DESCRIPTION: &str = "Scratch charge";

/// 課金通貨
pub const CHARGE_CURRENCY: &str = "usd";

/// 1回の課金で受け付ける最大ノート数
pub const MAX_STORAGE: u64 = 1_000_000;

/// 課金リクエストボディ
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BillingRequest {
    /// 保存したいノート数
    pub storage: u64,
    /// 決済サービスのカードトークン
    pub source: String,
}

impl BillingRequest {
    /// 値の範囲を検証
    pub fn validate(&self) -> Result<(), HandlerError> {
        if self.storage == 0 {
            return Err(HandlerError::InvalidBody(
                "storage must be greater than 0".to_string(),
            ));
        }
        if self.storage > MAX_STORAGE {
            return Err(HandlerError::InvalidBody(format!(
                "storage must be at most {}",
                MAX_STORAGE
            )));
        }
        if self.source.trim().is_empty() {
            return Err(HandlerError::InvalidBody("source must not be empty".to_string()));
        }
        Ok(())
    }
}

/// ノート数から請求額（セント）を計算
///
/// 単価はノート数に応じて段階的に下がる:
/// - 10件以下: 4ドル
/// - 100件以下: 2ドル
/// - それ以上: 1ドル
pub fn calculate_cost(storage: u64) -> u64 {
    let rate = if storage <= 10 {
        4
    } else if storage <= 100 {
        2
    } else {
        1
    };

    rate * storage * 100
}

/// 決済サービスへ送る課金内容
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charge {
    pub source: String,
    /// 金額（セント）
    pub amount: u64,
    pub description: String,
    pub currency: String,
}

impl Charge {
    /// 課金リクエストから課金内容を作成
    pub fn for_request(request: &BillingRequest) -> Self {
        Self {
            source: request.source.clone(),
            amount: calculate_cost(request.storage),
            description: CHARGE_DESCRIPTION.to_string(),
            currency: CHARGE_CURRENCY.to_string(),
        }
    }
}

/// 課金APIの成功レスポンス
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingResult {
    pub status: bool,
}

impl BillingResult {
    pub fn charged() -> Self {
        Self { status: true }
    }
}
