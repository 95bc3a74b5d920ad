use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use anoy_auth_types::token::TokenCodec;

use crate::infra::db::{
    DbAccountRepository, DbContentRepository, DbModerationStore, DbVerificationRepository,
};
use crate::infra::mail::HttpMailer;
use crate::password::PasswordHashing;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub codec: Arc<TokenCodec>,
    pub mailer: HttpMailer,
    pub hashing: PasswordHashing,
    pub email_verification_enabled: bool,
}

impl FromRef<AppState> for Arc<TokenCodec> {
    fn from_ref(state: &AppState) -> Self {
        state.codec.clone()
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl AppState {
    pub fn account_repo(&self) -> DbAccountRepository {
        DbAccountRepository {
            db: self.db.clone(),
        }
    }

    pub fn verification_repo(&self) -> DbVerificationRepository {
        DbVerificationRepository {
            db: self.db.clone(),
        }
    }

    pub fn content_repo(&self) -> DbContentRepository {
        DbContentRepository {
            db: self.db.clone(),
        }
    }

    pub fn moderation_store(&self) -> DbModerationStore {
        DbModerationStore {
            db: self.db.clone(),
        }
    }
}
