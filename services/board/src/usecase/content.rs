use chrono::Utc;

use crate::domain::repository::{
    AccountRepository, ContentRepository, ModerationScope, ModerationStore,
};
use crate::error::BoardServiceError;
use crate::usecase::account::resolve_caller;

// ── Owner: DeletePost ────────────────────────────────────────────────────────

pub struct DeleteOwnPostUseCase<A: AccountRepository, C: ContentRepository> {
    pub accounts: A,
    pub content: C,
}

impl<A: AccountRepository, C: ContentRepository> DeleteOwnPostUseCase<A, C> {
    /// Soft delete. Comments under the post are left as they are.
    pub async fn execute(&self, caller_email: &str, post_id: i64) -> Result<(), BoardServiceError> {
        let caller = resolve_caller(&self.accounts, caller_email).await?;
        let post = self
            .content
            .find_post(post_id)
            .await?
            .filter(|p| p.deleted_at.is_none())
            .ok_or(BoardServiceError::PostNotFound)?;
        if post.author_id != caller.id {
            return Err(BoardServiceError::Forbidden);
        }
        self.content.soft_delete_post(post_id, Utc::now()).await
    }
}

// ── Owner: DeleteComment ─────────────────────────────────────────────────────

pub struct DeleteOwnCommentUseCase<A: AccountRepository, C: ContentRepository> {
    pub accounts: A,
    pub content: C,
}

impl<A: AccountRepository, C: ContentRepository> DeleteOwnCommentUseCase<A, C> {
    /// Hard delete.
    pub async fn execute(
        &self,
        caller_email: &str,
        comment_id: i64,
    ) -> Result<(), BoardServiceError> {
        let caller = resolve_caller(&self.accounts, caller_email).await?;
        let comment = self
            .content
            .find_comment(comment_id)
            .await?
            .filter(|c| c.deleted_at.is_none())
            .ok_or(BoardServiceError::CommentNotFound)?;
        if comment.author_id != caller.id {
            return Err(BoardServiceError::Forbidden);
        }
        self.content.delete_comment(comment_id).await
    }
}

// ── Admin: DeletePost ────────────────────────────────────────────────────────

pub struct AdminDeletePostUseCase<C: ContentRepository, S: ModerationStore> {
    pub content: C,
    pub store: S,
}

impl<C: ContentRepository, S: ModerationStore> AdminDeletePostUseCase<C, S> {
    /// Soft-delete the post and its live comments together. Idempotent.
    pub async fn execute(&self, post_id: i64) -> Result<(), BoardServiceError> {
        self.content
            .find_post(post_id)
            .await?
            .ok_or(BoardServiceError::PostNotFound)?;

        let mut scope = self.store.begin().await?;
        let cascaded = scope
            .soft_delete_posts_and_comments_cascaded(&[post_id], Utc::now())
            .await?;
        scope.commit().await?;

        tracing::info!(post_id, comments = cascaded.comments, "post removed by admin");
        Ok(())
    }
}

// ── Admin: DeleteComment ─────────────────────────────────────────────────────

pub struct AdminDeleteCommentUseCase<C: ContentRepository> {
    pub content: C,
}

impl<C: ContentRepository> AdminDeleteCommentUseCase<C> {
    /// Soft delete; a second call leaves the first timestamp in place.
    pub async fn execute(&self, comment_id: i64) -> Result<(), BoardServiceError> {
        self.content
            .find_comment(comment_id)
            .await?
            .ok_or(BoardServiceError::CommentNotFound)?;
        if self.content.soft_delete_comment(comment_id, Utc::now()).await? {
            tracing::info!(comment_id, "comment removed by admin");
        }
        Ok(())
    }
}
