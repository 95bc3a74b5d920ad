//! Normalization of emails and activity ids.
//!
//! Both are compared and stored in their normalized form: surrounding
//! whitespace trimmed, then lowercased.

/// Maximum activity id length, counted in characters after normalization.
pub const MAX_ACTIVITY_ID_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActivityIdError {
    #[error("activity id is empty")]
    Empty,
    #[error("activity id is longer than {MAX_ACTIVITY_ID_LEN} characters")]
    TooLong,
}

/// Trim and lowercase. Returns `None` when nothing is left after trimming.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Normalize an activity id and enforce the 1–64 character bound.
pub fn normalize_activity_id(raw: &str) -> Result<String, ActivityIdError> {
    let normalized = normalize(raw).ok_or(ActivityIdError::Empty)?;
    if normalized.chars().count() > MAX_ACTIVITY_ID_LEN {
        return Err(ActivityIdError::TooLong);
    }
    Ok(normalized)
}
