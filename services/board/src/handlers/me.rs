use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use anoy_auth_types::session::{Authority, Session};
use anoy_domain::account::Role;

use crate::domain::types::Account;
use crate::error::BoardServiceError;
use crate::state::AppState;
use crate::usecase::account::{GetMeUseCase, UpdateActivityIdUseCase};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub email: String,
    pub activity_id: String,
    pub role: Role,
}

impl From<Account> for MeResponse {
    fn from(account: Account) -> Self {
        Self {
            email: account.email,
            activity_id: account.activity_id,
            role: account.role,
        }
    }
}

// ── GET /api/users/me ────────────────────────────────────────────────────────

pub async fn get_me(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, BoardServiceError> {
    let principal = session.require(Authority::User)?;
    let usecase = GetMeUseCase {
        accounts: state.account_repo(),
    };
    let account = usecase.execute(&principal.email).await?;
    Ok(Json(account.into()))
}

// ── PUT /api/users/me ────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub activity_id: String,
}

pub async fn update_me(
    session: Session,
    State(state): State<AppState>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<Json<MeResponse>, BoardServiceError> {
    let principal = session.require(Authority::User)?;
    let usecase = UpdateActivityIdUseCase {
        accounts: state.account_repo(),
    };
    let account = usecase
        .execute(&principal.email, &body.activity_id)
        .await?;
    Ok(Json(account.into()))
}
