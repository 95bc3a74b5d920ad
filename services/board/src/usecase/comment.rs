use chrono::Utc;

use crate::domain::repository::{AccountRepository, ContentRepository};
use crate::domain::types::{Comment, NewComment, validate_comment};
use crate::error::BoardServiceError;
use crate::usecase::account::resolve_caller;

pub struct CommentInput {
    pub content: String,
    pub parent_id: Option<i64>,
}

// ── CreateComment ────────────────────────────────────────────────────────────

pub struct CreateCommentUseCase<A: AccountRepository, C: ContentRepository> {
    pub accounts: A,
    pub content: C,
}

impl<A: AccountRepository, C: ContentRepository> CreateCommentUseCase<A, C> {
    /// Comment on a live post. A reply's parent must be a live comment on the
    /// same post.
    pub async fn execute(
        &self,
        caller_email: &str,
        post_id: i64,
        input: CommentInput,
    ) -> Result<Comment, BoardServiceError> {
        let caller = resolve_caller(&self.accounts, caller_email).await?;
        validate_comment(&input.content)?;

        self.content
            .find_post(post_id)
            .await?
            .filter(|p| p.deleted_at.is_none())
            .ok_or(BoardServiceError::PostNotFound)?;

        if let Some(parent_id) = input.parent_id {
            let parent = self
                .content
                .find_comment(parent_id)
                .await?
                .filter(|c| c.deleted_at.is_none())
                .ok_or(BoardServiceError::CommentNotFound)?;
            if parent.post_id != post_id {
                return Err(BoardServiceError::InvalidInput(
                    "parent comment belongs to another post",
                ));
            }
        }

        let comment = self
            .content
            .create_comment(&NewComment {
                post_id,
                parent_id: input.parent_id,
                author_id: caller.id,
                content: input.content,
                created_at: Utc::now(),
            })
            .await?;
        tracing::info!(comment_id = comment.id, post_id, "comment created");
        Ok(comment)
    }
}

// ── ListComments ─────────────────────────────────────────────────────────────

pub struct ListCommentsUseCase<C: ContentRepository> {
    pub content: C,
}

impl<C: ContentRepository> ListCommentsUseCase<C> {
    pub async fn execute(&self, post_id: i64) -> Result<Vec<Comment>, BoardServiceError> {
        self.content
            .find_post(post_id)
            .await?
            .filter(|p| p.deleted_at.is_none())
            .ok_or(BoardServiceError::PostNotFound)?;
        self.content.list_comments(post_id).await
    }
}
