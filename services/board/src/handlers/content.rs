use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use anoy_auth_types::session::{Authority, Session};
use anoy_domain::pagination::{Page, PageRequest};

use crate::domain::types::{Comment, Post};
use crate::error::BoardServiceError;
use crate::state::AppState;
use crate::usecase::comment::{CommentInput, CreateCommentUseCase, ListCommentsUseCase};
use crate::usecase::content::{DeleteOwnCommentUseCase, DeleteOwnPostUseCase};
use crate::usecase::post::{
    CreatePostUseCase, GetPostUseCase, ListPostsUseCase, PostInput, UpdatePostUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummaryResponse {
    pub id: i64,
    pub title: String,
    pub author_activity_id: String,
    #[serde(serialize_with = "anoy_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostSummaryResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            author_activity_id: post.author_activity_id,
            created_at: post.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_activity_id: String,
    #[serde(serialize_with = "anoy_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "anoy_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author_activity_id: post.author_activity_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author_activity_id: String,
    pub content: String,
    #[serde(serialize_with = "anoy_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            author_activity_id: comment.author_activity_id,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
}

impl From<PostRequest> for PostInput {
    fn from(body: PostRequest) -> Self {
        Self {
            title: body.title,
            content: body.content,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CommentRequest {
    pub content: String,
    pub parent_id: Option<i64>,
}

// ── GET /api/posts ───────────────────────────────────────────────────────────

pub async fn list_posts(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PostSummaryResponse>>, BoardServiceError> {
    let usecase = ListPostsUseCase {
        content: state.content_repo(),
        include_deleted: false,
    };
    let posts = usecase.execute(page).await?;
    Ok(Json(posts.map(PostSummaryResponse::from)))
}

// ── POST /api/posts ──────────────────────────────────────────────────────────

pub async fn create_post(
    session: Session,
    State(state): State<AppState>,
    Json(body): Json<PostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), BoardServiceError> {
    let principal = session.require(Authority::User)?;
    let usecase = CreatePostUseCase {
        accounts: state.account_repo(),
        content: state.content_repo(),
    };
    let post = usecase.execute(&principal.email, body.into()).await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

// ── GET /api/posts/{id} ──────────────────────────────────────────────────────

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<PostResponse>, BoardServiceError> {
    let usecase = GetPostUseCase {
        content: state.content_repo(),
    };
    Ok(Json(usecase.execute(post_id).await?.into()))
}

// ── PUT /api/posts/{id} ──────────────────────────────────────────────────────

pub async fn update_post(
    session: Session,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(body): Json<PostRequest>,
) -> Result<Json<PostResponse>, BoardServiceError> {
    let principal = session.require(Authority::User)?;
    let usecase = UpdatePostUseCase {
        accounts: state.account_repo(),
        content: state.content_repo(),
    };
    let post = usecase
        .execute(&principal.email, post_id, body.into())
        .await?;
    Ok(Json(post.into()))
}

// ── GET /api/posts/{id}/comments ─────────────────────────────────────────────

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<CommentResponse>>, BoardServiceError> {
    let usecase = ListCommentsUseCase {
        content: state.content_repo(),
    };
    let comments = usecase.execute(post_id).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

// ── POST /api/posts/{id}/comments ────────────────────────────────────────────

pub async fn create_comment(
    session: Session,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(body): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), BoardServiceError> {
    let principal = session.require(Authority::User)?;
    let usecase = CreateCommentUseCase {
        accounts: state.account_repo(),
        content: state.content_repo(),
    };
    let comment = usecase
        .execute(
            &principal.email,
            post_id,
            CommentInput {
                content: body.content,
                parent_id: body.parent_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

// ── DELETE /api/posts/{id} ───────────────────────────────────────────────────

pub async fn delete_own_post(
    session: Session,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, BoardServiceError> {
    let principal = session.require(Authority::User)?;
    let usecase = DeleteOwnPostUseCase {
        accounts: state.account_repo(),
        content: state.content_repo(),
    };
    usecase.execute(&principal.email, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /api/comments/{id} ────────────────────────────────────────────────

pub async fn delete_own_comment(
    session: Session,
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
) -> Result<StatusCode, BoardServiceError> {
    let principal = session.require(Authority::User)?;
    let usecase = DeleteOwnCommentUseCase {
        accounts: state.account_repo(),
        content: state.content_repo(),
    };
    usecase.execute(&principal.email, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
