/// DynamoDBでノートを管理するためのノートリポジトリ
///
/// テーブル構成:
/// - パーティションキー: `userId`
/// - ソートキー: `noteId`
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;
use tracing::debug;

use crate::domain::{HandlerError, Note, NoteDraft};

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// データのシリアライズ/デシリアライズに失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<RepositoryError> for HandlerError {
    fn from(err: RepositoryError) -> Self {
        HandlerError::Repository(err.to_string())
    }
}

/// ノート永続化のトレイト
///
/// 実際のDynamoDB実装とテスト用モックを差し替えられるようにする。
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// ノートを保存（同じキーがあれば上書き）
    async fn put(&self, note: &Note) -> Result<(), RepositoryError>;

    /// ノートを1件取得
    async fn get(&self, user_id: &str, note_id: &str) -> Result<Option<Note>, RepositoryError>;

    /// ユーザーの全ノートを取得
    async fn query(&self, user_id: &str) -> Result<Vec<Note>, RepositoryError>;

    /// 内容と添付を更新
    ///
    /// # 戻り値
    /// * 更新後のノート。対象が存在しない場合は`Ok(None)`
    async fn update(
        &self,
        user_id: &str,
        note_id: &str,
        draft: &NoteDraft,
    ) -> Result<Option<Note>, RepositoryError>;

    /// ノートを削除（存在しない場合も成功）
    async fn delete(&self, user_id: &str, note_id: &str) -> Result<(), RepositoryError>;
}

/// `Note`をDynamoDBのアイテムに変換
///
/// `None`のフィールドは属性自体を省略する。
pub fn note_to_item(note: &Note) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert("userId".to_string(), AttributeValue::S(note.user_id.clone()));
    item.insert("noteId".to_string(), AttributeValue::S(note.note_id.clone()));
    if let Some(content) = &note.content {
        item.insert("content".to_string(), AttributeValue::S(content.clone()));
    }
    if let Some(attachment) = &note.attachment {
        item.insert("attachment".to_string(), AttributeValue::S(attachment.clone()));
    }
    item.insert(
        "createdAt".to_string(),
        AttributeValue::N(note.created_at.to_string()),
    );
    item
}

/// DynamoDBのアイテムを`Note`に変換
pub fn item_to_note(item: &HashMap<String, AttributeValue>) -> Result<Note, RepositoryError> {
    let required_s = |name: &str| -> Result<String, RepositoryError> {
        item.get(name)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .ok_or_else(|| RepositoryError::SerializationError(format!("Missing {} field", name)))
    };
    // NULL属性は未設定として扱う
    let optional_s = |name: &str| item.get(name).and_then(|v| v.as_s().ok()).cloned();

    let created_at = item
        .get("createdAt")
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse::<i64>().ok())
        .ok_or_else(|| RepositoryError::SerializationError("Missing createdAt field".to_string()))?;

    Ok(Note {
        user_id: required_s("userId")?,
        note_id: required_s("noteId")?,
        content: optional_s("content"),
        attachment: optional_s("attachment"),
        created_at,
    })
}

fn optional_attribute(value: &Option<String>) -> AttributeValue {
    match value {
        Some(v) => AttributeValue::S(v.clone()),
        None => AttributeValue::Null(true),
    }
}

/// NoteRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoNoteRepository {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoNoteRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn key(user_id: &str, note_id: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([
            ("userId".to_string(), AttributeValue::S(user_id.to_string())),
            ("noteId".to_string(), AttributeValue::S(note_id.to_string())),
        ])
    }
}

#[async_trait]
impl NoteRepository for DynamoNoteRepository {
    async fn put(&self, note: &Note) -> Result<(), RepositoryError> {
        debug!(table = %self.table_name, note_id = %note.note_id, "DynamoDB put_item");

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(note_to_item(note)))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, user_id: &str, note_id: &str) -> Result<Option<Note>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(user_id, note_id)))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

        result.item.as_ref().map(item_to_note).transpose()
    }

    async fn query(&self, user_id: &str) -> Result<Vec<Note>, RepositoryError> {
        let mut notes = Vec::new();
        let mut start_key = None;

        // 1MBを超える結果はページングされる
        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("userId = :userId")
                .expression_attribute_values(":userId", AttributeValue::S(user_id.to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

            for item in output.items.unwrap_or_default() {
                notes.push(item_to_note(&item)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(notes)
    }

    async fn update(
        &self,
        user_id: &str,
        note_id: &str,
        draft: &NoteDraft,
    ) -> Result<Option<Note>, RepositoryError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(user_id, note_id)))
            .update_expression("SET content = :content, attachment = :attachment")
            .condition_expression("attribute_exists(noteId)")
            .expression_attribute_values(":content", optional_attribute(&draft.content))
            .expression_attribute_values(":attachment", optional_attribute(&draft.attachment))
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => output.attributes.as_ref().map(item_to_note).transpose(),
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_conditional_check_failed_exception())
                    .unwrap_or(false);
                if not_found {
                    Ok(None)
                } else {
                    Err(RepositoryError::WriteError(err.to_string()))
                }
            }
        }
    }

    async fn delete(&self, user_id: &str, note_id: &str) -> Result<(), RepositoryError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(user_id, note_id)))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.to_string()))?;

        Ok(())
    }
}
