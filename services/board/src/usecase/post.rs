use chrono::Utc;

use anoy_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{AccountRepository, ContentRepository};
use crate::domain::types::{NewPost, Post, validate_title};
use crate::error::BoardServiceError;
use crate::usecase::account::resolve_caller;

pub struct PostInput {
    pub title: String,
    pub content: String,
}

// ── CreatePost ───────────────────────────────────────────────────────────────

pub struct CreatePostUseCase<A: AccountRepository, C: ContentRepository> {
    pub accounts: A,
    pub content: C,
}

impl<A: AccountRepository, C: ContentRepository> CreatePostUseCase<A, C> {
    pub async fn execute(
        &self,
        caller_email: &str,
        input: PostInput,
    ) -> Result<Post, BoardServiceError> {
        let caller = resolve_caller(&self.accounts, caller_email).await?;
        let title = validate_title(&input.title)?;

        let post = self
            .content
            .create_post(&NewPost {
                author_id: caller.id,
                title,
                content: input.content,
                created_at: Utc::now(),
            })
            .await?;
        tracing::info!(post_id = post.id, author_id = caller.id, "post created");
        Ok(post)
    }
}

// ── GetPost ──────────────────────────────────────────────────────────────────

pub struct GetPostUseCase<C: ContentRepository> {
    pub content: C,
}

impl<C: ContentRepository> GetPostUseCase<C> {
    /// Soft-deleted posts read as missing.
    pub async fn execute(&self, post_id: i64) -> Result<Post, BoardServiceError> {
        self.content
            .get_post(post_id)
            .await?
            .filter(|p| p.deleted_at.is_none())
            .ok_or(BoardServiceError::PostNotFound)
    }
}

// ── ListPosts ────────────────────────────────────────────────────────────────

pub struct ListPostsUseCase<C: ContentRepository> {
    pub content: C,
    /// Admin listings also show soft-deleted posts.
    pub include_deleted: bool,
}

impl<C: ContentRepository> ListPostsUseCase<C> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<Post>, BoardServiceError> {
        self.content
            .list_posts(self.include_deleted, page.clamped())
            .await
    }
}

// ── UpdatePost ───────────────────────────────────────────────────────────────

pub struct UpdatePostUseCase<A: AccountRepository, C: ContentRepository> {
    pub accounts: A,
    pub content: C,
}

impl<A: AccountRepository, C: ContentRepository> UpdatePostUseCase<A, C> {
    /// Owner-only edit of a live post.
    pub async fn execute(
        &self,
        caller_email: &str,
        post_id: i64,
        input: PostInput,
    ) -> Result<Post, BoardServiceError> {
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
        let title = validate_title(&input.title)?;

        self.content
            .update_post(post_id, &title, &input.content, Utc::now())
            .await?;
        self.content
            .get_post(post_id)
            .await?
            .ok_or(BoardServiceError::PostNotFound)
    }
}
