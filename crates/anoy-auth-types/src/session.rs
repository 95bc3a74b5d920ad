//! Bearer-token session extractor.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::request::Parts;

use anoy_domain::account::Role;

use crate::token::{TokenCodec, VerifiedToken};

/// Capability a route can demand from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Authority {
    User,
    Admin,
}

/// Identity established from a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Token subject (account email).
    pub email: String,
    pub activity_id: Option<String>,
    authorities: Vec<Authority>,
}

impl Principal {
    /// Every authenticated caller holds `User`. `Admin` is added only when the
    /// role claim reads `ADMIN` in any case; a missing role claim means `User` only.
    pub fn from_token(token: VerifiedToken) -> Self {
        let mut authorities = vec![Authority::User];
        if token.role.as_deref().and_then(Role::parse) == Some(Role::Admin) {
            authorities.push(Authority::Admin);
        }
        Self {
            email: token.subject,
            activity_id: token.activity_id,
            authorities,
        }
    }

    pub fn authorities(&self) -> &[Authority] {
        &self.authorities
    }

    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.contains(&authority)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("authentication required")]
    Unauthenticated,
    #[error("insufficient authority")]
    Forbidden,
}

/// Per-request caller identity.
///
/// Extraction never fails: a missing, malformed, or expired token yields
/// `Anonymous`, and routes decide what to do with it via [`Session::require`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated(Principal),
}

impl Session {
    pub fn from_bearer(codec: &TokenCodec, bearer: Option<&str>) -> Self {
        let Some(token) = bearer else {
            return Self::Anonymous;
        };
        match codec.verify(token) {
            Ok(verified) => Self::Authenticated(Principal::from_token(verified)),
            Err(e) => {
                tracing::debug!(reason = %e, "bearer token rejected, continuing anonymously");
                Self::Anonymous
            }
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(p) => Some(p),
        }
    }

    pub fn has_authority(&self, authority: Authority) -> bool {
        self.principal()
            .is_some_and(|p| p.has_authority(authority))
    }

    /// Capability check used by routes: 401 when anonymous, 403 when the authority is missing.
    pub fn require(&self, authority: Authority) -> Result<&Principal, AccessDenied> {
        let principal = self.principal().ok_or(AccessDenied::Unauthenticated)?;
        if !principal.has_authority(authority) {
            return Err(AccessDenied::Forbidden);
        }
        Ok(principal)
    }
}

impl<S> FromRequestParts<S> for Session
where
    Arc<TokenCodec>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    // Same shape as axum-core's declaration: verify synchronously, hand back a 'static future.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let codec = Arc::<TokenCodec>::from_ref(state);
        let bearer = parts.headers.typed_get::<Authorization<Bearer>>();
        let session = Self::from_bearer(&codec, bearer.as_ref().map(|h| h.token()));

        async move { Ok(session) }
    }
}
