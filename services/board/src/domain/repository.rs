#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use anoy_domain::account::{Lifecycle, Role};
use anoy_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    Account, CascadeSummary, Comment, CommentRef, NewAccount, NewComment, NewPost, Post, PostRef,
    VerificationRecord,
};
use crate::error::BoardServiceError;

/// Account table access. Emails and activity ids passed in are already normalized.
pub trait AccountRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, BoardServiceError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, BoardServiceError>;

    async fn activity_id_exists(&self, activity_id: &str) -> Result<bool, BoardServiceError>;

    /// Insert a new account. With `consume_verification` set, the email's
    /// verification record is deleted in the same transaction.
    ///
    /// A unique-constraint violation surfaces as `EmailAlreadyRegistered` or
    /// `ActivityIdTaken`, the same errors the signup pre-checks return.
    async fn create(
        &self,
        account: &NewAccount,
        consume_verification: bool,
    ) -> Result<Account, BoardServiceError>;

    /// Move a lapsed suspension back to `ACTIVE`. Returns `false` and writes
    /// nothing if the row is no longer a suspension lapsed at `now`.
    async fn reactivate(&self, id: i64, now: DateTime<Utc>) -> Result<bool, BoardServiceError>;

    /// Rename. A collision surfaces as `ActivityIdTaken`.
    async fn update_activity_id(
        &self,
        id: i64,
        activity_id: &str,
    ) -> Result<(), BoardServiceError>;

    /// Returns `false` if no such account.
    async fn update_role(&self, id: i64, role: Role) -> Result<bool, BoardServiceError>;

    /// Substring match on activity id or email, newest first.
    async fn search(
        &self,
        query: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Account>, BoardServiceError>;
}

/// One pending verification per email.
pub trait VerificationRepository: Send + Sync {
    async fn find(&self, email: &str) -> Result<Option<VerificationRecord>, BoardServiceError>;

    /// Create or overwrite the record for `record.email`.
    async fn upsert(&self, record: &VerificationRecord) -> Result<(), BoardServiceError>;

    /// Stamp `verified_at = at` only if the stored code is still `code` and
    /// unexpired at `at`. Returns `false` when the record changed underneath.
    async fn mark_verified(
        &self,
        email: &str,
        code: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, BoardServiceError>;
}

/// Outbound mail. Failures come back as `MailDelivery`.
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), BoardServiceError>;
}

/// Posts and comments: authoring, reading, and per-resource deletes.
pub trait ContentRepository: Send + Sync {
    async fn create_post(&self, post: &NewPost) -> Result<Post, BoardServiceError>;

    /// Includes soft-deleted posts.
    async fn get_post(&self, id: i64) -> Result<Option<Post>, BoardServiceError>;

    /// Newest first. Soft-deleted posts only appear with `include_deleted`.
    async fn list_posts(
        &self,
        include_deleted: bool,
        page: PageRequest,
    ) -> Result<Page<Post>, BoardServiceError>;

    async fn update_post(
        &self,
        id: i64,
        title: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<(), BoardServiceError>;

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, BoardServiceError>;

    /// Live comments of one post, oldest first.
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, BoardServiceError>;

    /// Includes soft-deleted posts.
    async fn find_post(&self, id: i64) -> Result<Option<PostRef>, BoardServiceError>;

    async fn soft_delete_post(&self, id: i64, at: DateTime<Utc>) -> Result<(), BoardServiceError>;

    /// Includes soft-deleted comments.
    async fn find_comment(&self, id: i64) -> Result<Option<CommentRef>, BoardServiceError>;

    /// Physically removes the row.
    async fn delete_comment(&self, id: i64) -> Result<(), BoardServiceError>;

    /// Returns `true` if the comment was live and is now marked.
    async fn soft_delete_comment(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, BoardServiceError>;
}

/// Opens transaction scopes for multi-row moderation writes.
pub trait ModerationStore: Send + Sync {
    type Scope: ModerationScope;

    async fn begin(&self) -> Result<Self::Scope, BoardServiceError>;
}

/// A single open transaction.
///
/// Nothing written through the scope is visible to other readers until
/// [`ModerationScope::commit`]. Dropping the scope without committing rolls
/// everything back, on every exit path including `?` returns.
pub trait ModerationScope: Send {
    /// Read the account and hold a row lock on it until the scope ends.
    async fn lock_account(&mut self, id: i64) -> Result<Option<Account>, BoardServiceError>;

    async fn write_lifecycle(
        &mut self,
        id: i64,
        lifecycle: &Lifecycle,
    ) -> Result<(), BoardServiceError>;

    /// Every post authored by the account, soft-deleted ones included.
    async fn find_posts_by_owner(
        &mut self,
        account_id: i64,
    ) -> Result<Vec<PostRef>, BoardServiceError>;

    /// Stamp `at` on each listed post and on every comment of those posts,
    /// skipping rows that already carry a deletion time.
    async fn soft_delete_posts_and_comments_cascaded(
        &mut self,
        post_ids: &[i64],
        at: DateTime<Utc>,
    ) -> Result<CascadeSummary, BoardServiceError>;

    async fn commit(self) -> Result<(), BoardServiceError>;
}
