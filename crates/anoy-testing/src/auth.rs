//! Bearer-token helpers for integration tests.
//!
//! Tokens are minted with the same codec the service verifies with, so tests
//! exercise the real session extractor instead of bypassing it.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderValue, header};
use jsonwebtoken::{EncodingKey, Header, encode};

use anoy_auth_types::token::{SessionClaims, TokenCodec};
use anoy_domain::account::Role;

/// Signing secret shared by tests. Long enough for the codec's minimum.
pub const TEST_JWT_SECRET: &str = "anoy-integration-test-secret-0123456789";

pub fn test_codec() -> TokenCodec {
    TokenCodec::from_secret(TEST_JWT_SECRET, 3600).unwrap()
}

/// Identity to present on a test request.
pub struct MockSession {
    pub email: String,
    pub activity_id: String,
    pub role: Role,
}

impl MockSession {
    pub fn user(email: &str) -> Self {
        Self {
            email: email.to_owned(),
            activity_id: "tester".to_owned(),
            role: Role::User,
        }
    }

    pub fn admin(email: &str) -> Self {
        Self {
            email: email.to_owned(),
            activity_id: "moderator".to_owned(),
            role: Role::Admin,
        }
    }

    pub fn token(&self) -> String {
        test_codec()
            .issue(
                &self.email,
                &SessionClaims {
                    activity_id: self.activity_id.clone(),
                    role: self.role,
                },
            )
            .unwrap()
            .token
    }

    /// `Authorization: Bearer <token>` value.
    pub fn bearer(&self) -> (header::HeaderName, HeaderValue) {
        bearer_header(&self.token())
    }
}

pub fn bearer_header(token: &str) -> (header::HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

/// A token carrying only `sub` and `exp`, as issued before role and
/// activity-id claims existed.
pub fn legacy_token(email: &str) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 3600;
    encode(
        &Header::default(),
        &serde_json::json!({ "sub": email, "exp": exp }),
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}
