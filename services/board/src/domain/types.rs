use chrono::{DateTime, Duration, Utc};

use anoy_domain::account::{Lifecycle, Role};

use crate::error::BoardServiceError;

/// Verification code time-to-live, counted from issue.
pub const VERIFICATION_CODE_TTL_SECS: i64 = 3600;

/// How long a verified record stays usable for signup, counted from `verified_at`.
pub const VERIFICATION_CONSUME_WINDOW_SECS: i64 = 3600;

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub activity_id: String,
    pub password_hash: String,
    pub role: Role,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row to insert at signup. Status is always `ACTIVE`.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub activity_id: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRecord {
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl VerificationRecord {
    /// Fresh record for a just-issued code.
    pub fn issue(email: String, code: String, now: DateTime<Utc>) -> Self {
        Self {
            email,
            code,
            expires_at: now + Duration::seconds(VERIFICATION_CODE_TTL_SECS),
            verified_at: None,
        }
    }

    /// `code` must already be trimmed. Exact match, strictly before expiry.
    pub fn accepts(&self, code: &str, now: DateTime<Utc>) -> bool {
        self.code == code && now < self.expires_at
    }

    /// Whether this record may authorize a signup happening at `now`.
    pub fn check_consumable(&self, now: DateTime<Utc>) -> Result<(), BoardServiceError> {
        let verified_at = self
            .verified_at
            .ok_or(BoardServiceError::VerificationRequired)?;
        if verified_at < now - Duration::seconds(VERIFICATION_CONSUME_WINDOW_SECS) {
            return Err(BoardServiceError::VerificationExpired);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostRef {
    pub id: i64,
    pub author_id: i64,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentRef {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Longest accepted post title, in characters.
pub const POST_TITLE_MAX_CHARS: usize = 255;

/// Longest accepted comment body, in characters.
pub const COMMENT_MAX_CHARS: usize = 5000;

/// A post with its author's current activity id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub author_activity_id: String,
    pub title: String,
    pub content: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author_id: i64,
    pub author_activity_id: String,
    pub content: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Trimmed title, 1 to [`POST_TITLE_MAX_CHARS`] characters.
pub fn validate_title(raw: &str) -> Result<String, BoardServiceError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(BoardServiceError::InvalidInput("title is required"));
    }
    if title.chars().count() > POST_TITLE_MAX_CHARS {
        return Err(BoardServiceError::InvalidInput("title is too long"));
    }
    Ok(title.to_owned())
}

/// Comment bodies must have visible text and stay within [`COMMENT_MAX_CHARS`].
/// The body is stored as written.
pub fn validate_comment(raw: &str) -> Result<(), BoardServiceError> {
    if raw.trim().is_empty() {
        return Err(BoardServiceError::InvalidInput("comment is required"));
    }
    if raw.chars().count() > COMMENT_MAX_CHARS {
        return Err(BoardServiceError::InvalidInput("comment is too long"));
    }
    Ok(())
}

/// Rows newly marked by a cascading soft delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub posts: u64,
    pub comments: u64,
}
