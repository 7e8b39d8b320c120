/// 環境変数からの設定読み込み
///
/// 環境変数:
/// - TABLE_NAME: ノート保存用DynamoDBテーブル名
/// - STRIPE_SECRET_KEY: Stripeシークレットキー
/// - STRIPE_SECRET_KEY_PARAMETER: Stripeシークレットキーを格納したSSMパラメータ名
///   （STRIPE_SECRET_KEYが未設定の場合に使用）
/// - NOTES_DEBUG: `false`または`0`でデバッグトレーサーを無効化
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_ssm::Client as SsmClient;
use thiserror::Error;
use tracing::info;

use crate::domain::HandlerError;

const TABLE_NAME_VAR: &str = "TABLE_NAME";
const STRIPE_SECRET_KEY_VAR: &str = "STRIPE_SECRET_KEY";
const STRIPE_SECRET_KEY_PARAMETER_VAR: &str = "STRIPE_SECRET_KEY_PARAMETER";
const NOTES_DEBUG_VAR: &str = "NOTES_DEBUG";

/// 設定読み込みのエラー型
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("SSM parameter error: {0}")]
    SsmError(String),
}

impl From<ConfigError> for HandlerError {
    fn from(err: ConfigError) -> Self {
        HandlerError::Configuration(err.to_string())
    }
}

/// 必須の環境変数を読み込む（空文字は未設定扱い）
fn required_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// ノートテーブルの設定
#[derive(Debug, Clone)]
pub struct NotesTableConfig {
    client: DynamoDbClient,
    table_name: String,
}

impl NotesTableConfig {
    /// 環境からAWS設定を読み込み、TABLE_NAMEからテーブル名を取得
    pub async fn from_env() -> Result<Self, ConfigError> {
        let table_name = Self::table_name_from_env()?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = DynamoDbClient::new(&aws_config);

        Ok(Self { client, table_name })
    }

    /// 明示的な値で作成
    pub fn new(client: DynamoDbClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// TABLE_NAMEを読み込む
    pub fn table_name_from_env() -> Result<String, ConfigError> {
        required_var(TABLE_NAME_VAR)
    }

    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// Stripeの設定
#[derive(Clone)]
pub struct StripeConfig {
    secret_key: String,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig").finish_non_exhaustive()
    }
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
        }
    }

    /// STRIPE_SECRET_KEYから読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        required_var(STRIPE_SECRET_KEY_VAR).map(Self::new)
    }

    /// STRIPE_SECRET_KEY、なければSSMパラメータから読み込む
    ///
    /// SSMパラメータはSecureStringを想定し、復号して取得する。
    pub async fn from_env_with_ssm() -> Result<Self, ConfigError> {
        if let Ok(config) = Self::from_env() {
            return Ok(config);
        }

        let parameter_name = required_var(STRIPE_SECRET_KEY_PARAMETER_VAR).map_err(|_| {
            ConfigError::MissingEnvVar(format!(
                "{} or {}",
                STRIPE_SECRET_KEY_VAR, STRIPE_SECRET_KEY_PARAMETER_VAR
            ))
        })?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = SsmClient::new(&aws_config);

        info!(parameter = %parameter_name, "SSMからStripeシークレットキーを取得");

        let output = client
            .get_parameter()
            .name(&parameter_name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| ConfigError::SsmError(e.to_string()))?;

        let secret_key = output
            .parameter()
            .and_then(|p| p.value())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ConfigError::SsmError(format!("parameter {} has no value", parameter_name))
            })?;

        Ok(Self::new(secret_key))
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

/// デバッグトレーサーを使うかどうか（既定は有効）
pub fn debug_enabled_from_env() -> bool {
    match std::env::var(NOTES_DEBUG_VAR) {
        Ok(value) => !matches!(value.trim().to_ascii_lowercase().as_str(), "false" | "0" | "off"),
        Err(_) => true,
    }
}
