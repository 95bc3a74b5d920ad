use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use anoy_core::cors::cors_layer;
use anoy_core::health::{healthz, readyz};
use anoy_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    admin::{
        delete_comment, delete_post, list_accounts, list_all_posts, remove_account, set_role,
        set_status,
    },
    auth::{check_activity_id, login, send_code, signup, verify_code},
    content::{
        create_comment, create_post, delete_own_comment, delete_own_post, get_post,
        list_comments, list_posts, update_post,
    },
    me::{get_me, update_me},
};
use crate::state::AppState;

pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Identity
        .route("/api/auth/activity-id/available", get(check_activity_id))
        .route("/api/auth/send-code", post(send_code))
        .route("/api/auth/verify-code", post(verify_code))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        // Caller
        .route("/api/users/me", get(get_me).put(update_me))
        // Board
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/{id}",
            get(get_post).put(update_post).delete(delete_own_post),
        )
        .route(
            "/api/posts/{id}/comments",
            get(list_comments).post(create_comment),
        )
        .route("/api/comments/{id}", delete(delete_own_comment))
        // Moderation
        .route("/api/admin/users", get(list_accounts))
        .route("/api/admin/users/{id}", delete(remove_account))
        .route("/api/admin/users/{id}/status", patch(set_status))
        .route("/api/admin/users/{id}/role", patch(set_role))
        .route("/api/admin/posts", get(list_all_posts))
        .route("/api/admin/posts/{id}", delete(delete_post))
        .route("/api/admin/comments/{id}", delete(delete_comment))
        .layer(cors_layer(cors_origins))
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
