use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, SecondsFormat, Utc};

use anoy_auth_types::session::AccessDenied;
use anoy_domain::normalize::ActivityIdError;

/// Board service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum BoardServiceError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error(transparent)]
    InvalidActivityId(#[from] ActivityIdError),
    #[error("email already registered")]
    EmailAlreadyRegistered,
    #[error("activity id already in use")]
    ActivityIdTaken,
    // Unknown email and wrong password render identically; only logs tell them apart.
    #[error("invalid email or password")]
    AccountNotFound,
    #[error("invalid email or password")]
    BadCredentials,
    #[error("account has been deleted")]
    AccountDeleted,
    #[error("{}", suspension_message(.until))]
    AccountSuspended { until: Option<DateTime<Utc>> },
    #[error("email verification required")]
    VerificationRequired,
    #[error("email verification expired")]
    VerificationExpired,
    #[error("failed to deliver verification mail")]
    MailDelivery(#[source] anyhow::Error),
    #[error("authentication required")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("account not found")]
    UserNotFound,
    #[error("post not found")]
    PostNotFound,
    #[error("comment not found")]
    CommentNotFound,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

fn suspension_message(until: &Option<DateTime<Utc>>) -> String {
    match until {
        None => "account is suspended indefinitely".to_owned(),
        Some(until) => format!(
            "account is suspended until {}",
            until.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
    }
}

impl From<AccessDenied> for BoardServiceError {
    fn from(e: AccessDenied) -> Self {
        match e {
            AccessDenied::Unauthenticated => Self::Unauthorized,
            AccessDenied::Forbidden => Self::Forbidden,
        }
    }
}

impl BoardServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidActivityId(_) => "INVALID_ACTIVITY_ID",
            Self::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            Self::ActivityIdTaken => "ACTIVITY_ID_TAKEN",
            Self::AccountNotFound | Self::BadCredentials => "INVALID_CREDENTIALS",
            Self::AccountDeleted => "ACCOUNT_DELETED",
            Self::AccountSuspended { .. } => "ACCOUNT_SUSPENDED",
            Self::VerificationRequired => "VERIFICATION_REQUIRED",
            Self::VerificationExpired => "VERIFICATION_EXPIRED",
            Self::MailDelivery(_) => "MAIL_DELIVERY_FAILED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "ACCOUNT_NOT_FOUND",
            Self::PostNotFound => "POST_NOT_FOUND",
            Self::CommentNotFound => "COMMENT_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::InvalidActivityId(_) => StatusCode::BAD_REQUEST,
            Self::EmailAlreadyRegistered | Self::ActivityIdTaken => StatusCode::CONFLICT,
            Self::AccountNotFound | Self::BadCredentials | Self::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            Self::AccountDeleted | Self::AccountSuspended { .. } | Self::Forbidden => {
                StatusCode::FORBIDDEN
            }
            Self::VerificationRequired | Self::VerificationExpired => {
                StatusCode::PRECONDITION_FAILED
            }
            Self::MailDelivery(_) => StatusCode::BAD_GATEWAY,
            Self::UserNotFound | Self::PostNotFound | Self::CommentNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BoardServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer already records method/uri/status for every request; only
        // server-side failures need their error chain logged here.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error")
            }
            Self::MailDelivery(e) => {
                tracing::error!(error = %format!("{e:#}"), kind = "MAIL_DELIVERY_FAILED", "mail delivery failed")
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
