/// ノート作成オペレーション
///
/// リクエストボディの`content`と`attachment`から新しいノートを作り、
/// 呼び出し元のCognito Identity IDをユーザーIDとして保存する。
use async_trait::async_trait;
use tracing::info;

use crate::application::BusinessOperation;
use crate::domain::{ApiEvent, HandlerError, InvocationContext, Note, NoteDraft};
use crate::infrastructure::NoteRepository;

pub struct CreateNoteOperation<R>
where
    R: NoteRepository,
{
    repository: R,
}

impl<R> CreateNoteOperation<R>
where
    R: NoteRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R> BusinessOperation for CreateNoteOperation<R>
where
    R: NoteRepository,
{
    type Output = Note;

    async fn execute(
        &self,
        event: &ApiEvent,
        context: &InvocationContext,
    ) -> Result<Note, HandlerError> {
        let draft: NoteDraft = event.parse_body()?;
        let user_id = event.caller_id().ok_or(HandlerError::MissingIdentity)?;

        let note = Note::new(user_id, draft);

        context.debug(format!(
            "NoteRepository.put userId={} noteId={}",
            note.user_id, note.note_id
        ));
        self.repository.put(&note).await?;

        info!(
            request_id = context.request_id(),
            user_id = %note.user_id,
            note_id = %note.note_id,
            "ノート作成完了"
        );

        Ok(note)
    }
}
