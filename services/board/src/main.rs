use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use anoy_auth_types::token::TokenCodec;
use anoy_board::config::BoardConfig;
use anoy_board::infra::mail::HttpMailer;
use anoy_board::password::PasswordHashing;
use anoy_board::router::build_router;
use anoy_board::state::AppState;
use anoy_core::config::Config;
use anoy_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing("info,sqlx=warn");

    let config = BoardConfig::from_env().expect("failed to load board config");
    info!(?config, "configuration loaded");

    let codec = TokenCodec::from_secret(&config.jwt_secret, config.jwt_expiration_secs)
        .expect("invalid JWT_SECRET");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let mailer = HttpMailer::new(
        config.mail_api_url.clone(),
        config.mail_api_key.clone(),
        config.mail_from.clone(),
    )
    .expect("failed to build mail client");

    let state = AppState {
        db,
        codec: Arc::new(codec),
        mailer,
        hashing: PasswordHashing::default(),
        email_verification_enabled: config.email_verification_enabled,
    };

    let router = build_router(state, &config.cors_allowed_origins);
    let addr = format!("0.0.0.0:{}", config.board_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("board service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
