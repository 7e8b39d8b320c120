/// ノートモデル
///
/// ノートテーブルに保存される1件分のレコード。
/// - `user_id`: Cognito Identity ID（パーティションキー）
/// - `note_id`: 作成時に生成するUUID（ソートキー）
/// - `created_at`: 作成時刻（Unixミリ秒）
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub user_id: String,
    pub note_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// 添付ファイルのS3キー
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    pub created_at: i64,
}

/// リクエストボディから受け取るノートの内容
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NoteDraft {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub attachment: Option<String>,
}

impl Note {
    /// 新しいノートを作成
    ///
    /// IDは新規UUID、作成時刻は現在時刻を使用する。
    pub fn new(user_id: impl Into<String>, draft: NoteDraft) -> Self {
        Self {
            user_id: user_id.into(),
            note_id: Uuid::new_v4().to_string(),
            content: draft.content,
            attachment: draft.attachment,
            created_at: Utc::now().timestamp_millis(),
        }
    }

    /// 内容を差し替えたノートを返す（ID・作成時刻は維持）
    pub fn with_draft(self, draft: NoteDraft) -> Self {
        Self {
            content: draft.content,
            attachment: draft.attachment,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(content: &str) -> NoteDraft {
        NoteDraft {
            content: Some(content.to_string()),
            attachment: None,
        }
    }

    #[test]
    fn test_new_note_fields() {
        let before = Utc::now().timestamp_millis();
        let note = Note::new("user-1", draft("hello"));
        let after = Utc::now().timestamp_millis();

        assert_eq!(note.user_id, "user-1");
        assert_eq!(note.content.as_deref(), Some("hello"));
        assert!(note.attachment.is_none());
        assert!(Uuid::parse_str(&note.note_id).is_ok());
        assert!(note.created_at >= before && note.created_at <= after);
    }

    #[test]
    fn test_note_ids_are_unique() {
        let a = Note::new("user-1", draft("a"));
        let b = Note::new("user-1", draft("a"));
        assert_ne!(a.note_id, b.note_id);
    }

    #[test]
    fn test_serializes_camel_case_and_skips_missing() {
        let note = Note {
            user_id: "user-1".to_string(),
            note_id: "note-1".to_string(),
            content: Some("hello".to_string()),
            attachment: None,
            created_at: 1_700_000_000_000,
        };

        let value = serde_json::to_value(&note).unwrap();

        assert_eq!(
            value,
            json!({
                "userId": "user-1",
                "noteId": "note-1",
                "content": "hello",
                "createdAt": 1_700_000_000_000_i64
            })
        );
    }

    #[test]
    fn test_draft_accepts_partial_body() {
        let draft: NoteDraft = serde_json::from_str(r#"{"attachment":"file.png"}"#).unwrap();
        assert!(draft.content.is_none());
        assert_eq!(draft.attachment.as_deref(), Some("file.png"));
    }

    #[test]
    fn test_with_draft_keeps_identity() {
        let note = Note::new("user-1", draft("old"));
        let updated = note.clone().with_draft(draft("new"));

        assert_eq!(updated.note_id, note.note_id);
        assert_eq!(updated.created_at, note.created_at);
        assert_eq!(updated.content.as_deref(), Some("new"));
    }
}
