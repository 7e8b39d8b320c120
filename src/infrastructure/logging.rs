/// ログ基盤モジュール
///
/// Lambda環境向けの構造化ログ設定を提供する。
/// CloudWatch Logsで検索しやすいよう、1イベント1行のJSONで出力する。
use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG`未設定時のログレベル
const DEFAULT_LOG_LEVEL: &str = "info";

static INIT: Once = Once::new();

/// Lambda環境向けのログサブスクライバーを初期化する
///
/// コールドスタート時に各バイナリの`main`から呼び出す。
/// 複数回呼び出しても最初の1回だけが有効。
///
/// # 使用例
/// ```ignore
/// use notes_api::infrastructure::init_logging;
///
/// init_logging();
/// tracing::info!(function = "create", "Lambda関数を初期化");
/// ```
pub fn init_logging() {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

        // Lambdaが付与するタイムスタンプと重複するためspan情報は出さない
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .flatten_event(true)
            .with_current_span(false);

        // 他で初期化済みの場合は何もしない
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init();
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}
