use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use anoy_domain::account::Role;

use crate::error::BoardServiceError;
use crate::state::AppState;
use crate::usecase::activity_id::CheckActivityIdUseCase;
use crate::usecase::login::{LoginInput, LoginUseCase};
use crate::usecase::signup::{SignupInput, SignupUseCase};
use crate::usecase::verification::{SendCodeUseCase, VerifyCodeUseCase};

// ── GET /api/auth/activity-id/available ──────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivityIdQuery {
    pub activity_id: String,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

pub async fn check_activity_id(
    State(state): State<AppState>,
    Query(query): Query<ActivityIdQuery>,
) -> Result<Json<AvailabilityResponse>, BoardServiceError> {
    let usecase = CheckActivityIdUseCase {
        accounts: state.account_repo(),
    };
    let available = usecase.execute(&query.activity_id).await?;
    Ok(Json(AvailabilityResponse { available }))
}

// ── POST /api/auth/send-code ─────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SendCodeRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct SendCodeResponse {
    pub sent: bool,
}

pub async fn send_code(
    State(state): State<AppState>,
    Json(body): Json<SendCodeRequest>,
) -> Result<Json<SendCodeResponse>, BoardServiceError> {
    let usecase = SendCodeUseCase {
        verifications: state.verification_repo(),
        mailer: state.mailer.clone(),
        enabled: state.email_verification_enabled,
    };
    let sent = usecase.execute(&body.email).await?;
    Ok(Json(SendCodeResponse { sent }))
}

// ── POST /api/auth/verify-code ───────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct VerifyCodeResponse {
    pub verified: bool,
}

pub async fn verify_code(
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, BoardServiceError> {
    let usecase = VerifyCodeUseCase {
        verifications: state.verification_repo(),
    };
    let verified = usecase.execute(&body.email, &body.code).await?;
    Ok(Json(VerifyCodeResponse { verified }))
}

// ── POST /api/auth/signup ────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub activity_id: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub ok: bool,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), BoardServiceError> {
    let usecase = SignupUseCase {
        accounts: state.account_repo(),
        verifications: state.verification_repo(),
        hashing: state.hashing.clone(),
        verification_enabled: state.email_verification_enabled,
    };
    usecase
        .execute(SignupInput {
            email: body.email,
            password: body.password,
            activity_id: body.activity_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(SignupResponse { ok: true })))
}

// ── POST /api/auth/login ─────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub activity_id: String,
    pub role: Role,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, BoardServiceError> {
    let usecase = LoginUseCase {
        accounts: state.account_repo(),
        hashing: state.hashing.clone(),
        codec: state.codec.clone(),
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginResponse {
        token: out.token,
        activity_id: out.activity_id,
        role: out.role,
    }))
}
