use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use anoy_auth_types::session::{Authority, Session};
use anoy_domain::account::{AccountStatus, Role, StatusChange};
use anoy_domain::pagination::{Page, PageRequest};

use crate::domain::types::{Account, Post};
use crate::error::BoardServiceError;
use crate::state::AppState;
use crate::usecase::content::{AdminDeleteCommentUseCase, AdminDeletePostUseCase};
use crate::usecase::moderation::{
    ListAccountsUseCase, RemoveAccountUseCase, SetRoleUseCase, SetStatusUseCase,
};
use crate::usecase::post::ListPostsUseCase;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: i64,
    pub email: String,
    pub activity_id: String,
    pub status: AccountStatus,
    pub role: Role,
    #[serde(serialize_with = "anoy_core::serde::opt_to_rfc3339_ms")]
    pub suspended_until: Option<DateTime<Utc>>,
    #[serde(serialize_with = "anoy_core::serde::opt_to_rfc3339_ms")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            activity_id: account.activity_id,
            status: account.lifecycle.status,
            role: account.role,
            suspended_until: account.lifecycle.suspended_until,
            deleted_at: account.lifecycle.deleted_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub author_activity_id: String,
    #[serde(serialize_with = "anoy_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "anoy_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    #[serde(serialize_with = "anoy_core::serde::opt_to_rfc3339_ms")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Post> for AdminPostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            author_activity_id: post.author_activity_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
            deleted_at: post.deleted_at,
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct AccountListQuery {
    pub q: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

// ── GET /api/admin/users ─────────────────────────────────────────────────────

pub async fn list_accounts(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<AccountListQuery>,
) -> Result<Json<Page<AccountResponse>>, BoardServiceError> {
    session.require(Authority::Admin)?;
    let defaults = PageRequest::default();
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(defaults.per_page),
        page: query.page.unwrap_or(defaults.page),
    };
    let usecase = ListAccountsUseCase {
        accounts: state.account_repo(),
    };
    let accounts = usecase.execute(query.q.as_deref(), page).await?;
    Ok(Json(accounts.map(AccountResponse::from)))
}

// ── PATCH /api/admin/users/{id}/status ───────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub status: String,
    #[serde(default)]
    pub suspended_until: Option<DateTime<Utc>>,
}

pub async fn set_status(
    session: Session,
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
    Json(body): Json<SetStatusRequest>,
) -> Result<StatusCode, BoardServiceError> {
    session.require(Authority::Admin)?;
    let status = AccountStatus::parse(&body.status)
        .ok_or(BoardServiceError::InvalidInput("unknown account status"))?;
    let usecase = SetStatusUseCase {
        store: state.moderation_store(),
    };
    usecase
        .execute(account_id, StatusChange::new(status, body.suspended_until))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PATCH /api/admin/users/{id}/role ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

pub async fn set_role(
    session: Session,
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
    Json(body): Json<SetRoleRequest>,
) -> Result<StatusCode, BoardServiceError> {
    session.require(Authority::Admin)?;
    let role = Role::parse(&body.role).ok_or(BoardServiceError::InvalidInput("unknown role"))?;
    let usecase = SetRoleUseCase {
        accounts: state.account_repo(),
    };
    usecase.execute(account_id, role).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /api/admin/users/{id} ─────────────────────────────────────────────

pub async fn remove_account(
    session: Session,
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<StatusCode, BoardServiceError> {
    session.require(Authority::Admin)?;
    let usecase = RemoveAccountUseCase {
        store: state.moderation_store(),
    };
    usecase.execute(account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /api/admin/posts ─────────────────────────────────────────────────────

pub async fn list_all_posts(
    session: Session,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AdminPostResponse>>, BoardServiceError> {
    session.require(Authority::Admin)?;
    let usecase = ListPostsUseCase {
        content: state.content_repo(),
        include_deleted: true,
    };
    let posts = usecase.execute(page).await?;
    Ok(Json(posts.map(AdminPostResponse::from)))
}

// ── DELETE /api/admin/posts/{id} ─────────────────────────────────────────────

pub async fn delete_post(
    session: Session,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, BoardServiceError> {
    session.require(Authority::Admin)?;
    let usecase = AdminDeletePostUseCase {
        content: state.content_repo(),
        store: state.moderation_store(),
    };
    usecase.execute(post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /api/admin/comments/{id} ──────────────────────────────────────────

pub async fn delete_comment(
    session: Session,
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
) -> Result<StatusCode, BoardServiceError> {
    session.require(Authority::Admin)?;
    let usecase = AdminDeleteCommentUseCase {
        content: state.content_repo(),
    };
    usecase.execute(comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
