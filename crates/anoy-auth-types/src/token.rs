//! Session token issue and verification.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use anoy_domain::account::Role;

/// Minimum signing key length in bytes (256 bits).
pub const MIN_SECRET_BYTES: usize = 32;

/// Errors returned when building a [`TokenCodec`].
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("signing secret decodes to {0} bytes, at least {MIN_SECRET_BYTES} required")]
    TooShort(usize),
}

/// Errors returned by [`TokenCodec::verify`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | account email |
/// | `activity_id` | `activityId` | public pseudonym |
/// | `role` | `role` | `"USER"` or `"ADMIN"` |
/// | `iat` / `exp` | `iat` / `exp` | seconds since epoch |
///
/// `activityId` and `role` are optional on the way in: tokens minted before
/// those claims existed must still verify.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(
        rename = "activityId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub iat: u64,
    pub exp: u64,
}

/// Claims supplied when issuing a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub activity_id: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: u64,
    pub expires_at: u64,
}

/// Subject and claims recovered from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: String,
    pub activity_id: Option<String>,
    /// Raw role claim as carried by the token.
    pub role: Option<String>,
    pub issued_at: u64,
    pub expires_at: u64,
}

/// HS256 signer/verifier. Built once at startup and shared read-only.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime_secs: u64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Standard base64 if the secret decodes cleanly, raw UTF-8 bytes otherwise.
fn key_material(secret: &str) -> Vec<u8> {
    STANDARD
        .decode(secret.trim())
        .unwrap_or_else(|_| secret.as_bytes().to_vec())
}

impl TokenCodec {
    /// Build a codec from the configured secret.
    ///
    /// Fails if the key material is shorter than [`MIN_SECRET_BYTES`]; callers
    /// should treat that as fatal at startup.
    pub fn from_secret(secret: &str, lifetime_secs: u64) -> Result<Self, KeyError> {
        let key = key_material(secret);
        if key.len() < MIN_SECRET_BYTES {
            return Err(KeyError::TooShort(key.len()));
        }

        // No leeway: a token is dead the second its `exp` passes.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(&key),
            decoding: DecodingKey::from_secret(&key),
            validation,
            lifetime_secs,
        })
    }

    pub fn lifetime_secs(&self) -> u64 {
        self.lifetime_secs
    }

    pub fn issue(
        &self,
        subject: &str,
        claims: &SessionClaims,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        self.issue_at(subject, claims, now_secs())
    }

    /// Issue a token as if the current time were `issued_at`.
    pub fn issue_at(
        &self,
        subject: &str,
        claims: &SessionClaims,
        issued_at: u64,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let expires_at = issued_at + self.lifetime_secs;
        let payload = JwtClaims {
            sub: subject.to_owned(),
            activity_id: Some(claims.activity_id.clone()),
            role: Some(claims.role.as_str().to_owned()),
            iat: issued_at,
            exp: expires_at,
        };
        let token = encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)?;
        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Validate signature and expiry, returning the embedded subject and claims.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        let data = decode::<JwtClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            }
        })?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(AuthError::Malformed);
        }
        Ok(VerifiedToken {
            subject: claims.sub,
            activity_id: claims.activity_id,
            role: claims.role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}
