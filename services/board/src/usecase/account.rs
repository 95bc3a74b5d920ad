use anoy_domain::account::AccountStatus;
use anoy_domain::normalize::normalize_activity_id;

use crate::domain::repository::AccountRepository;
use crate::domain::types::Account;
use crate::error::BoardServiceError;

/// Look up the account behind a session subject.
///
/// Tokens outlive account removal, so a missing or `DELETED` account is
/// treated as unauthenticated.
pub async fn resolve_caller<A: AccountRepository>(
    accounts: &A,
    email: &str,
) -> Result<Account, BoardServiceError> {
    match accounts.find_by_email(email).await? {
        Some(account) if account.lifecycle.status != AccountStatus::Deleted => Ok(account),
        _ => Err(BoardServiceError::Unauthorized),
    }
}

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> GetMeUseCase<A> {
    pub async fn execute(&self, email: &str) -> Result<Account, BoardServiceError> {
        resolve_caller(&self.accounts, email).await
    }
}

// ── UpdateActivityId ─────────────────────────────────────────────────────────

pub struct UpdateActivityIdUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> UpdateActivityIdUseCase<A> {
    /// Same normalization and uniqueness rules as signup. Renaming to the
    /// caller's current id is a no-op.
    pub async fn execute(&self, email: &str, raw: &str) -> Result<Account, BoardServiceError> {
        let mut account = resolve_caller(&self.accounts, email).await?;
        let activity_id = normalize_activity_id(raw)?;
        if activity_id == account.activity_id {
            return Ok(account);
        }
        if self.accounts.activity_id_exists(&activity_id).await? {
            return Err(BoardServiceError::ActivityIdTaken);
        }
        self.accounts
            .update_activity_id(account.id, &activity_id)
            .await?;

        tracing::info!(account_id = account.id, "activity id changed");
        account.activity_id = activity_id;
        Ok(account)
    }
}
