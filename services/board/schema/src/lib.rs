//! sea-orm entities for the board database.

pub mod accounts;
pub mod comments;
pub mod email_verifications;
pub mod posts;

/// Unique index names. Infra code matches on these to classify constraint violations.
pub const UQ_ACCOUNTS_EMAIL: &str = "uq_accounts_email";
pub const UQ_ACCOUNTS_ACTIVITY_ID: &str = "uq_accounts_activity_id";
