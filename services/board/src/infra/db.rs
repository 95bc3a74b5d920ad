use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr, TransactionError, TransactionTrait,
};

use anoy_board_schema::{
    UQ_ACCOUNTS_ACTIVITY_ID, UQ_ACCOUNTS_EMAIL, accounts, comments, email_verifications, posts,
};
use anoy_domain::account::{AccountStatus, Lifecycle, Role};
use anoy_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{
    AccountRepository, ContentRepository, ModerationScope, ModerationStore,
    VerificationRepository,
};
use crate::domain::types::{
    Account, CascadeSummary, Comment, CommentRef, NewAccount, NewComment, NewPost, Post, PostRef,
    VerificationRecord,
};
use crate::error::BoardServiceError;

/// Classify a write failure: unique-index hits become the matching conflict
/// error, anything else is internal.
fn write_error(err: DbErr, context: &'static str) -> BoardServiceError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        if detail.contains(UQ_ACCOUNTS_ACTIVITY_ID) {
            return BoardServiceError::ActivityIdTaken;
        }
        if detail.contains(UQ_ACCOUNTS_EMAIL) {
            return BoardServiceError::EmailAlreadyRegistered;
        }
    }
    BoardServiceError::Internal(anyhow::Error::new(err).context(context))
}

fn flatten_txn_error(err: TransactionError<DbErr>) -> DbErr {
    match err {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => e,
    }
}

fn account_from_model(model: accounts::Model) -> anyhow::Result<Account> {
    let role = Role::parse(&model.role)
        .with_context(|| format!("account {} has unknown role {:?}", model.id, model.role))?;
    let status = AccountStatus::parse(&model.status)
        .with_context(|| format!("account {} has unknown status {:?}", model.id, model.status))?;
    Ok(Account {
        id: model.id,
        email: model.email,
        activity_id: model.activity_id,
        password_hash: model.password_hash,
        role,
        lifecycle: Lifecycle {
            status,
            suspended_until: model.suspended_until,
            deleted_at: model.deleted_at,
        },
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn post_from_model(model: posts::Model) -> PostRef {
    PostRef {
        id: model.id,
        author_id: model.author_id,
        deleted_at: model.deleted_at,
    }
}

fn comment_from_model(model: comments::Model) -> CommentRef {
    CommentRef {
        id: model.id,
        post_id: model.post_id,
        author_id: model.author_id,
        deleted_at: model.deleted_at,
    }
}

fn post_with_author(model: posts::Model, author: Option<accounts::Model>) -> anyhow::Result<Post> {
    let author = author.with_context(|| format!("post {} has no author row", model.id))?;
    Ok(Post {
        id: model.id,
        author_id: model.author_id,
        author_activity_id: author.activity_id,
        title: model.title,
        content: model.content,
        deleted_at: model.deleted_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn comment_with_author(
    model: comments::Model,
    author: Option<accounts::Model>,
) -> anyhow::Result<Comment> {
    let author = author.with_context(|| format!("comment {} has no author row", model.id))?;
    Ok(Comment {
        id: model.id,
        post_id: model.post_id,
        parent_id: model.parent_id,
        author_id: model.author_id,
        author_activity_id: author.activity_id,
        content: model.content,
        deleted_at: model.deleted_at,
        created_at: model.created_at,
    })
}

fn verification_from_model(model: email_verifications::Model) -> VerificationRecord {
    VerificationRecord {
        email: model.email,
        code: model.code,
        expires_at: model.expires_at,
        verified_at: model.verified_at,
    }
}

// ── Account repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountRepository {
    pub db: DatabaseConnection,
}

impl AccountRepository for DbAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, BoardServiceError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find account by email")?;
        Ok(model.map(account_from_model).transpose()?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, BoardServiceError> {
        let model = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find account by id")?;
        Ok(model.map(account_from_model).transpose()?)
    }

    async fn activity_id_exists(&self, activity_id: &str) -> Result<bool, BoardServiceError> {
        let count = accounts::Entity::find()
            .filter(accounts::Column::ActivityId.eq(activity_id))
            .count(&self.db)
            .await
            .context("count accounts by activity id")?;
        Ok(count > 0)
    }

    async fn create(
        &self,
        account: &NewAccount,
        consume_verification: bool,
    ) -> Result<Account, BoardServiceError> {
        let account = account.clone();
        let model = self
            .db
            .transaction::<_, accounts::Model, DbErr>(|txn| {
                Box::pin(async move {
                    if consume_verification {
                        email_verifications::Entity::delete_by_id(account.email.clone())
                            .exec(txn)
                            .await?;
                    }
                    accounts::ActiveModel {
                        email: Set(account.email),
                        activity_id: Set(account.activity_id),
                        password_hash: Set(account.password_hash),
                        role: Set(account.role.as_str().to_owned()),
                        status: Set(AccountStatus::Active.as_str().to_owned()),
                        suspended_until: Set(None),
                        deleted_at: Set(None),
                        created_at: Set(account.created_at),
                        updated_at: Set(account.created_at),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                })
            })
            .await
            .map_err(|e| write_error(flatten_txn_error(e), "create account"))?;
        Ok(account_from_model(model)?)
    }

    async fn reactivate(&self, id: i64, now: DateTime<Utc>) -> Result<bool, BoardServiceError> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Status,
                Expr::value(AccountStatus::Active.as_str()),
            )
            .col_expr(
                accounts::Column::SuspendedUntil,
                Expr::value(None::<DateTime<Utc>>),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
            .filter(accounts::Column::Id.eq(id))
            .filter(accounts::Column::Status.eq(AccountStatus::Suspended.as_str()))
            .filter(accounts::Column::SuspendedUntil.lte(now))
            .exec(&self.db)
            .await
            .context("reactivate account")?;
        Ok(result.rows_affected > 0)
    }

    async fn update_activity_id(
        &self,
        id: i64,
        activity_id: &str,
    ) -> Result<(), BoardServiceError> {
        accounts::ActiveModel {
            id: Set(id),
            activity_id: Set(activity_id.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| write_error(e, "update activity id"))?;
        Ok(())
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<bool, BoardServiceError> {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::Role, Expr::value(role.as_str()))
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("update account role")?;
        Ok(result.rows_affected > 0)
    }

    async fn search(
        &self,
        query: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Account>, BoardServiceError> {
        let mut select = accounts::Entity::find();
        if let Some(q) = query {
            select = select.filter(
                Condition::any()
                    .add(accounts::Column::ActivityId.contains(q))
                    .add(accounts::Column::Email.contains(q)),
            );
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .context("count accounts for search")?;
        let models = select
            .order_by_desc(accounts::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("search accounts")?;

        let items = models
            .into_iter()
            .map(account_from_model)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }
}

// ── Verification repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationRepository {
    pub db: DatabaseConnection,
}

impl VerificationRepository for DbVerificationRepository {
    async fn find(&self, email: &str) -> Result<Option<VerificationRecord>, BoardServiceError> {
        let model = email_verifications::Entity::find_by_id(email.to_owned())
            .one(&self.db)
            .await
            .context("find email verification")?;
        Ok(model.map(verification_from_model))
    }

    async fn upsert(&self, record: &VerificationRecord) -> Result<(), BoardServiceError> {
        let model = email_verifications::ActiveModel {
            email: Set(record.email.clone()),
            code: Set(record.code.clone()),
            expires_at: Set(record.expires_at),
            verified_at: Set(record.verified_at),
            updated_at: Set(Utc::now()),
        };
        email_verifications::Entity::insert(model)
            .on_conflict(
                OnConflict::column(email_verifications::Column::Email)
                    .update_columns([
                        email_verifications::Column::Code,
                        email_verifications::Column::ExpiresAt,
                        email_verifications::Column::VerifiedAt,
                        email_verifications::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .context("upsert email verification")?;
        Ok(())
    }

    async fn mark_verified(
        &self,
        email: &str,
        code: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, BoardServiceError> {
        let result = email_verifications::Entity::update_many()
            .col_expr(email_verifications::Column::VerifiedAt, Expr::value(at))
            .col_expr(email_verifications::Column::UpdatedAt, Expr::value(at))
            .filter(email_verifications::Column::Email.eq(email))
            .filter(email_verifications::Column::Code.eq(code))
            .filter(email_verifications::Column::ExpiresAt.gt(at))
            .exec(&self.db)
            .await
            .context("mark email verified")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Content repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbContentRepository {
    pub db: DatabaseConnection,
}

impl ContentRepository for DbContentRepository {
    async fn create_post(&self, post: &NewPost) -> Result<Post, BoardServiceError> {
        let model = posts::ActiveModel {
            author_id: Set(post.author_id),
            title: Set(post.title.clone()),
            content: Set(post.content.clone()),
            deleted_at: Set(None),
            created_at: Set(post.created_at),
            updated_at: Set(post.created_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("insert post")?;
        let created = self
            .get_post(model.id)
            .await?
            .with_context(|| format!("post {} missing after insert", model.id))?;
        Ok(created)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, BoardServiceError> {
        let row = posts::Entity::find_by_id(id)
            .find_also_related(accounts::Entity)
            .one(&self.db)
            .await
            .context("get post")?;
        Ok(row
            .map(|(post, author)| post_with_author(post, author))
            .transpose()?)
    }

    async fn list_posts(
        &self,
        include_deleted: bool,
        page: PageRequest,
    ) -> Result<Page<Post>, BoardServiceError> {
        let mut select = posts::Entity::find();
        if !include_deleted {
            select = select.filter(posts::Column::DeletedAt.is_null());
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .context("count posts")?;
        let rows = select
            .order_by_desc(posts::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .find_also_related(accounts::Entity)
            .all(&self.db)
            .await
            .context("list posts")?;

        let items = rows
            .into_iter()
            .map(|(post, author)| post_with_author(post, author))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }

    async fn update_post(
        &self,
        id: i64,
        title: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<(), BoardServiceError> {
        posts::ActiveModel {
            id: Set(id),
            title: Set(title.to_owned()),
            content: Set(content.to_owned()),
            updated_at: Set(at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update post")?;
        Ok(())
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, BoardServiceError> {
        let model = comments::ActiveModel {
            post_id: Set(comment.post_id),
            author_id: Set(comment.author_id),
            parent_id: Set(comment.parent_id),
            content: Set(comment.content.clone()),
            deleted_at: Set(None),
            created_at: Set(comment.created_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("insert comment")?;
        let (model, author) = comments::Entity::find_by_id(model.id)
            .find_also_related(accounts::Entity)
            .one(&self.db)
            .await
            .context("reload comment")?
            .with_context(|| format!("comment {} missing after insert", model.id))?;
        Ok(comment_with_author(model, author)?)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, BoardServiceError> {
        let rows = comments::Entity::find()
            .filter(comments::Column::PostId.eq(post_id))
            .filter(comments::Column::DeletedAt.is_null())
            .order_by_asc(comments::Column::Id)
            .find_also_related(accounts::Entity)
            .all(&self.db)
            .await
            .context("list comments")?;
        let comments = rows
            .into_iter()
            .map(|(comment, author)| comment_with_author(comment, author))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(comments)
    }

    async fn find_post(&self, id: i64) -> Result<Option<PostRef>, BoardServiceError> {
        let model = posts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find post")?;
        Ok(model.map(post_from_model))
    }

    async fn soft_delete_post(&self, id: i64, at: DateTime<Utc>) -> Result<(), BoardServiceError> {
        posts::Entity::update_many()
            .col_expr(posts::Column::DeletedAt, Expr::value(at))
            .filter(posts::Column::Id.eq(id))
            .filter(posts::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .context("soft delete post")?;
        Ok(())
    }

    async fn find_comment(&self, id: i64) -> Result<Option<CommentRef>, BoardServiceError> {
        let model = comments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find comment")?;
        Ok(model.map(comment_from_model))
    }

    async fn delete_comment(&self, id: i64) -> Result<(), BoardServiceError> {
        comments::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete comment")?;
        Ok(())
    }

    async fn soft_delete_comment(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, BoardServiceError> {
        let result = comments::Entity::update_many()
            .col_expr(comments::Column::DeletedAt, Expr::value(at))
            .filter(comments::Column::Id.eq(id))
            .filter(comments::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .context("soft delete comment")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Moderation store ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbModerationStore {
    pub db: DatabaseConnection,
}

impl ModerationStore for DbModerationStore {
    type Scope = DbModerationScope;

    async fn begin(&self) -> Result<DbModerationScope, BoardServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .context("begin moderation transaction")?;
        Ok(DbModerationScope { txn })
    }
}

/// Wraps an open transaction; sea-orm rolls it back if dropped uncommitted.
pub struct DbModerationScope {
    txn: DatabaseTransaction,
}

impl ModerationScope for DbModerationScope {
    async fn lock_account(&mut self, id: i64) -> Result<Option<Account>, BoardServiceError> {
        let model = accounts::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .context("lock account")?;
        Ok(model.map(account_from_model).transpose()?)
    }

    async fn write_lifecycle(
        &mut self,
        id: i64,
        lifecycle: &Lifecycle,
    ) -> Result<(), BoardServiceError> {
        accounts::ActiveModel {
            id: Set(id),
            status: Set(lifecycle.status.as_str().to_owned()),
            suspended_until: Set(lifecycle.suspended_until),
            deleted_at: Set(lifecycle.deleted_at),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.txn)
        .await
        .context("write account lifecycle")?;
        Ok(())
    }

    async fn find_posts_by_owner(
        &mut self,
        account_id: i64,
    ) -> Result<Vec<PostRef>, BoardServiceError> {
        let models = posts::Entity::find()
            .filter(posts::Column::AuthorId.eq(account_id))
            .all(&self.txn)
            .await
            .context("find posts by owner")?;
        Ok(models.into_iter().map(post_from_model).collect())
    }

    async fn soft_delete_posts_and_comments_cascaded(
        &mut self,
        post_ids: &[i64],
        at: DateTime<Utc>,
    ) -> Result<CascadeSummary, BoardServiceError> {
        if post_ids.is_empty() {
            return Ok(CascadeSummary::default());
        }

        let posts = posts::Entity::update_many()
            .col_expr(posts::Column::DeletedAt, Expr::value(at))
            .filter(posts::Column::Id.is_in(post_ids.iter().copied()))
            .filter(posts::Column::DeletedAt.is_null())
            .exec(&self.txn)
            .await
            .context("cascade soft delete posts")?;
        let comments = comments::Entity::update_many()
            .col_expr(comments::Column::DeletedAt, Expr::value(at))
            .filter(comments::Column::PostId.is_in(post_ids.iter().copied()))
            .filter(comments::Column::DeletedAt.is_null())
            .exec(&self.txn)
            .await
            .context("cascade soft delete comments")?;

        Ok(CascadeSummary {
            posts: posts.rows_affected,
            comments: comments.rows_affected,
        })
    }

    async fn commit(self) -> Result<(), BoardServiceError> {
        self.txn
            .commit()
            .await
            .context("commit moderation transaction")?;
        Ok(())
    }
}
