// リクエスト単位のデバッグログバッファ
//
// トレーサーとビジネスオペレーションが共有するハンドル。
// 1回の呼び出しごとに新しく作られ、プロセス全体で共有されることはない。

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

/// バッファされたデバッグメッセージ
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    /// 記録時刻（Unixミリ秒）
    pub timestamp_ms: i64,
    /// メッセージ本文
    pub message: String,
}

/// デバッグメッセージの記録ハンドル
///
/// `Clone`しても同じバッファを指す。`disabled()`で作成したものは何も記録しない。
#[derive(Debug, Clone, Default)]
pub struct TraceRecorder {
    entries: Option<Arc<Mutex<Vec<TraceEntry>>>>,
}

impl TraceRecorder {
    /// 記録が有効なレコーダーを作成
    pub fn new() -> Self {
        Self {
            entries: Some(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// 何も記録しないレコーダーを作成
    pub fn disabled() -> Self {
        Self { entries: None }
    }

    /// 記録が有効かどうか
    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// メッセージを記録
    pub fn debug(&self, message: impl Into<String>) {
        if let Some(mut entries) = self.lock() {
            entries.push(TraceEntry {
                timestamp_ms: Utc::now().timestamp_millis(),
                message: message.into(),
            });
        }
    }

    /// 記録済みメッセージのコピーを取得
    pub fn entries(&self) -> Vec<TraceEntry> {
        self.lock().map(|e| e.to_vec()).unwrap_or_default()
    }

    /// 記録済みメッセージを取り出してバッファを空にする
    pub fn take(&self) -> Vec<TraceEntry> {
        self.lock().map(|mut e| std::mem::take(&mut *e)).unwrap_or_default()
    }

    /// バッファを空にする
    pub fn clear(&self) {
        if let Some(mut entries) = self.lock() {
            entries.clear();
        }
    }

    /// 記録件数
    pub fn len(&self) -> usize {
        self.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // パニックで汚染されたロックもバッファとしては使い続ける
    fn lock(&self) -> Option<MutexGuard<'_, Vec<TraceEntry>>> {
        self.entries
            .as_ref()
            .map(|entries| entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_records_in_order() {
        let recorder = TraceRecorder::new();
        recorder.debug("first");
        recorder.debug("second".to_string());

        let entries = recorder.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].message, "second");
        assert!(entries[0].timestamp_ms <= entries[1].timestamp_ms);
    }

    #[test]
    fn test_clones_share_buffer() {
        let recorder = TraceRecorder::new();
        let handle = recorder.clone();

        handle.debug("from clone");

        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_take_empties_buffer() {
        let recorder = TraceRecorder::new();
        recorder.debug("a");

        let taken = recorder.take();

        assert_eq!(taken.len(), 1);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_clear() {
        let recorder = TraceRecorder::new();
        recorder.debug("a");
        recorder.debug("b");

        recorder.clear();

        assert!(recorder.is_empty());
    }

    #[test]
    fn test_disabled_recorder_drops_messages() {
        let recorder = TraceRecorder::disabled();
        recorder.debug("ignored");

        assert!(!recorder.is_enabled());
        assert!(recorder.entries().is_empty());
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_default_is_disabled() {
        assert!(!TraceRecorder::default().is_enabled());
    }
}
